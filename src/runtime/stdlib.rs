use crate::language::scope::{IdentifierInfo, ScopeHandle};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::interpreter::call_function;
use crate::runtime::scope::ScopeRef;
use crate::runtime::value::{
    ArrayValue, BuiltinFunction, FunctionValue, Value, ValueRef, boolean, null, number, string,
    to_string_value,
};
use std::f64::consts;
use std::io::{self, BufRead, Read, Write};
use std::rc::Rc;

const CONST_BINDING: IdentifierInfo = IdentifierInfo { is_const: true };

/// Seed the runtime global scope with the builtin library.
pub fn install(scope: &ScopeRef) {
    for (name, value) in bindings() {
        scope
            .declare(&name, CONST_BINDING, value)
            .expect("builtin names are unique");
    }
}

/// Seed the parse-time global scope with the same names, so references to
/// builtins pass the parser's declaration checking and assignments to them
/// are rejected as writes to constants.
pub fn declare_names(scope: &ScopeHandle) {
    for (name, _) in bindings() {
        assert!(
            scope.declare(&name, CONST_BINDING),
            "builtin names are unique"
        );
    }
}

fn bindings() -> Vec<(String, ValueRef)> {
    let mut entries = Vec::new();
    entries.extend(io_entries());
    entries.extend(meta_entries());
    entries.extend(collection_entries());
    entries.extend(math_entries());
    entries.extend(functional_entries());
    entries
}

fn builtin_entry(
    name: &str,
    behavior: impl Fn(&ScopeRef, &[ValueRef]) -> RuntimeResult<ValueRef> + 'static,
) -> (String, ValueRef) {
    let function = FunctionValue::Builtin(BuiltinFunction {
        name: name.to_string(),
        behavior: Rc::new(behavior),
    });
    (name.to_string(), Rc::new(Value::Function(function)))
}

fn expect_arity(name: &str, expected: usize, arguments: &[ValueRef]) -> RuntimeResult<()> {
    if arguments.len() != expected {
        return Err(RuntimeError::InvalidArgumentCount {
            function: name.to_string(),
            expected,
            received: arguments.len(),
        });
    }
    Ok(())
}

fn number_argument(arguments: &[ValueRef], position: usize) -> RuntimeResult<f64> {
    match &*arguments[position] {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::type_error(format!(
            "argument {} is not of type Number, found {}",
            position + 1,
            other.type_name()
        ))),
    }
}

fn function_argument(arguments: &[ValueRef], position: usize) -> RuntimeResult<ValueRef> {
    match &*arguments[position] {
        Value::Function(_) => Ok(Rc::clone(&arguments[position])),
        other => Err(RuntimeError::type_error(format!(
            "argument {} is not of type Function, found {}",
            position + 1,
            other.type_name()
        ))),
    }
}

fn io_entries() -> Vec<(String, ValueRef)> {
    vec![
        builtin_entry("print", |_scope, arguments| {
            let mut stdout = io::stdout().lock();
            for (index, argument) in arguments.iter().enumerate() {
                if index > 0 {
                    let _ = write!(stdout, " ");
                }
                let _ = write!(stdout, "{argument}");
            }
            let _ = stdout.flush();
            Ok(null())
        }),
        builtin_entry("println", |_scope, arguments| {
            let mut stdout = io::stdout().lock();
            for (index, argument) in arguments.iter().enumerate() {
                if index > 0 {
                    let _ = write!(stdout, " ");
                }
                let _ = write!(stdout, "{argument}");
            }
            let _ = writeln!(stdout);
            let _ = stdout.flush();
            Ok(null())
        }),
        builtin_entry("read", |_scope, arguments| {
            expect_arity("read", 0, arguments)?;
            match read_word() {
                Some(word) => Ok(string(word)),
                None => Ok(null()),
            }
        }),
        builtin_entry("readln", |_scope, arguments| {
            expect_arity("readln", 0, arguments)?;
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => Ok(null()),
                Ok(_) => {
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    Ok(string(line))
                }
            }
        }),
    ]
}

/// The next whitespace-delimited word on stdin, or None at end of input.
/// Words are split on ASCII whitespace only, so multi-byte sequences pass
/// through intact; the collected bytes are decoded as UTF-8 at the end.
fn read_word() -> Option<String> {
    let stdin = io::stdin().lock();
    let mut word = Vec::new();
    for byte in stdin.bytes() {
        let Ok(byte) = byte else { break };
        if byte.is_ascii_whitespace() {
            if word.is_empty() {
                continue;
            }
            break;
        }
        word.push(byte);
    }
    if word.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&word).into_owned())
    }
}

fn meta_entries() -> Vec<(String, ValueRef)> {
    vec![
        builtin_entry("reference_equals", |_scope, arguments| {
            expect_arity("reference_equals", 2, arguments)?;
            Ok(boolean(Rc::ptr_eq(&arguments[0], &arguments[1])))
        }),
        builtin_entry("is_defined", |scope, arguments| {
            expect_arity("is_defined", 1, arguments)?;
            let name = to_string_value(&arguments[0])?;
            Ok(boolean(scope.is_declared(&name)))
        }),
    ]
}

fn collection_entries() -> Vec<(String, ValueRef)> {
    vec![
        builtin_entry("length", |_scope, arguments| {
            expect_arity("length", 1, arguments)?;
            let length = match &*arguments[0] {
                Value::Array(array) => array.len(),
                Value::String(text) => text.chars().count(),
                Value::Object(object) => object.len(),
                other => {
                    return Err(RuntimeError::type_error(format!(
                        "length expects an Array, String or Object, found {}",
                        other.type_name()
                    )));
                }
            };
            Ok(number(length as f64))
        }),
        builtin_entry("keys", |_scope, arguments| {
            expect_arity("keys", 1, arguments)?;
            let Value::Object(object) = &*arguments[0] else {
                return Err(RuntimeError::type_error(format!(
                    "keys expects an Object, found {}",
                    arguments[0].type_name()
                )));
            };
            let keys = object.keys().into_iter().map(string).collect();
            Ok(Rc::new(Value::Array(ArrayValue::from_elements(keys))))
        }),
    ]
}

fn unary_math(name: &'static str, f: fn(f64) -> f64) -> (String, ValueRef) {
    builtin_entry(name, move |_scope, arguments| {
        expect_arity(name, 1, arguments)?;
        Ok(number(f(number_argument(arguments, 0)?)))
    })
}

fn binary_math(name: &'static str, f: fn(f64, f64) -> f64) -> (String, ValueRef) {
    builtin_entry(name, move |_scope, arguments| {
        expect_arity(name, 2, arguments)?;
        let a = number_argument(arguments, 0)?;
        let b = number_argument(arguments, 1)?;
        Ok(number(f(a, b)))
    })
}

fn math_entries() -> Vec<(String, ValueRef)> {
    vec![
        ("PI".to_string(), number(consts::PI)),
        ("E".to_string(), number(consts::E)),
        unary_math("abs", f64::abs),
        unary_math("sqrt", f64::sqrt),
        unary_math("cbrt", f64::cbrt),
        unary_math("floor", f64::floor),
        unary_math("ceil", f64::ceil),
        unary_math("sign", |x| {
            if x == 0.0 {
                0.0
            } else if x < 0.0 {
                -1.0
            } else {
                1.0
            }
        }),
        unary_math("factorial", |x| gamma(x + 1.0)),
        unary_math("gamma", gamma),
        binary_math("max", f64::max),
        binary_math("min", f64::min),
        unary_math("exp", f64::exp),
        unary_math("exp2", f64::exp2),
        unary_math("log", f64::ln),
        unary_math("log10", f64::log10),
        unary_math("log2", f64::log2),
        unary_math("sin", f64::sin),
        unary_math("cos", f64::cos),
        unary_math("tan", f64::tan),
        unary_math("asin", f64::asin),
        unary_math("acos", f64::acos),
        unary_math("atan", f64::atan),
        binary_math("atan2", f64::atan2),
        unary_math("sinh", f64::sinh),
        unary_math("cosh", f64::cosh),
        unary_math("tanh", f64::tanh),
        unary_math("asinh", f64::asinh),
        unary_math("acosh", f64::acosh),
        unary_math("atanh", f64::atanh),
    ]
}

/// Lanczos approximation (g = 7). The standard library has no stable gamma
/// yet, and the nine-term fit is accurate to around 15 significant digits
/// over the range scripts use.
fn gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        consts::PI / ((consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        let x = x - 1.0;
        let mut sum = COEFFICIENTS[0];
        for (index, coefficient) in COEFFICIENTS.iter().enumerate().skip(1) {
            sum += coefficient / (x + index as f64);
        }
        let t = x + 7.5;
        (2.0 * consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * sum
    }
}

fn functional_entries() -> Vec<(String, ValueRef)> {
    vec![
        builtin_entry("id", |_scope, arguments| {
            expect_arity("id", 1, arguments)?;
            Ok(Rc::clone(&arguments[0]))
        }),
        builtin_entry("constant", |_scope, arguments| {
            if arguments.is_empty() {
                return Err(RuntimeError::InvalidArgumentCount {
                    function: "constant".to_string(),
                    expected: 1,
                    received: 0,
                });
            }
            let captured = Rc::clone(&arguments[0]);
            let function = FunctionValue::Builtin(BuiltinFunction {
                name: "constant".to_string(),
                behavior: Rc::new(move |_scope, _arguments| Ok(Rc::clone(&captured))),
            });
            Ok(Rc::new(Value::Function(function)))
        }),
        builtin_entry("bind", |_scope, arguments| {
            if arguments.is_empty() {
                return Err(RuntimeError::InvalidArgumentCount {
                    function: "bind".to_string(),
                    expected: 1,
                    received: 0,
                });
            }
            let function = function_argument(arguments, 0)?;
            if arguments.len() < 2 {
                return Ok(function);
            }

            let bound: Vec<ValueRef> = arguments[1..].iter().map(Rc::clone).collect();
            let partial = FunctionValue::Builtin(BuiltinFunction {
                name: "bind".to_string(),
                behavior: Rc::new(move |scope, following| {
                    let mut all = bound.clone();
                    all.extend(following.iter().map(Rc::clone));
                    call_function(&function, scope, &all)
                }),
            });
            Ok(Rc::new(Value::Function(partial)))
        }),
        builtin_entry("compose", |_scope, arguments| {
            if arguments.is_empty() {
                return Err(RuntimeError::InvalidArgumentCount {
                    function: "compose".to_string(),
                    expected: 1,
                    received: 0,
                });
            }
            let mut functions = Vec::with_capacity(arguments.len());
            for position in 0..arguments.len() {
                functions.push(function_argument(arguments, position)?);
            }

            let composed = FunctionValue::Builtin(BuiltinFunction {
                name: "compose".to_string(),
                behavior: Rc::new(move |scope, arguments| {
                    let mut current: Vec<ValueRef> = arguments.to_vec();
                    let mut result = null();
                    for function in functions.iter().rev() {
                        result = call_function(function, scope, &current)?;
                        current = vec![Rc::clone(&result)];
                    }
                    Ok(result)
                }),
            });
            Ok(Rc::new(Value::Function(composed)))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::to_number;

    fn globals() -> ScopeRef {
        let scope = ScopeRef::global();
        install(&scope);
        scope
    }

    fn call(scope: &ScopeRef, name: &str, arguments: &[ValueRef]) -> RuntimeResult<ValueRef> {
        let function = scope.value_of(name).expect("builtin not installed");
        call_function(&function, scope, arguments)
    }

    #[test]
    fn math_functions_check_arity_and_types() {
        let scope = globals();
        let result = call(&scope, "sqrt", &[number(9.0)]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 3.0);

        assert!(matches!(
            call(&scope, "sqrt", &[number(1.0), number(2.0)]),
            Err(RuntimeError::InvalidArgumentCount {
                expected: 1,
                received: 2,
                ..
            })
        ));
        assert!(matches!(
            call(&scope, "sqrt", &[string("9")]),
            Err(RuntimeError::Type { .. })
        ));
        assert!(matches!(
            call(&scope, "atan2", &[number(1.0)]),
            Err(RuntimeError::InvalidArgumentCount { expected: 2, .. })
        ));
    }

    #[test]
    fn factorial_matches_the_integer_ladder() {
        let scope = globals();
        for (input, expected) in [(0.0, 1.0), (1.0, 1.0), (5.0, 120.0), (10.0, 3628800.0)] {
            let result = call(&scope, "factorial", &[number(input)]).unwrap();
            let value = to_number(&result).unwrap();
            assert!(
                (value - expected).abs() < 1e-6 * expected.max(1.0),
                "factorial({input}) = {value}, expected {expected}"
            );
        }
    }

    #[test]
    fn sign_splits_the_number_line() {
        let scope = globals();
        for (input, expected) in [(-3.5, -1.0), (0.0, 0.0), (12.0, 1.0)] {
            let result = call(&scope, "sign", &[number(input)]).unwrap();
            assert_eq!(to_number(&result).unwrap(), expected);
        }
    }

    #[test]
    fn constants_are_installed() {
        let scope = globals();
        assert_eq!(
            to_number(&scope.value_of("PI").unwrap()).unwrap(),
            consts::PI
        );
        assert_eq!(to_number(&scope.value_of("E").unwrap()).unwrap(), consts::E);
    }

    #[test]
    fn reference_equals_distinguishes_handles() {
        let scope = globals();
        let shared = number(1.0);
        let result = call(
            &scope,
            "reference_equals",
            &[Rc::clone(&shared), Rc::clone(&shared)],
        )
        .unwrap();
        assert!(matches!(&*result, Value::Boolean(true)));

        let result = call(&scope, "reference_equals", &[number(1.0), number(1.0)]).unwrap();
        assert!(matches!(&*result, Value::Boolean(false)));
    }

    #[test]
    fn is_defined_consults_the_calling_scope() {
        let scope = globals();
        let result = call(&scope, "is_defined", &[string("print")]).unwrap();
        assert!(matches!(&*result, Value::Boolean(true)));
        let result = call(&scope, "is_defined", &[string("ghost")]).unwrap();
        assert!(matches!(&*result, Value::Boolean(false)));
    }

    #[test]
    fn length_covers_arrays_strings_and_objects() {
        let scope = globals();
        let array: ValueRef = Rc::new(Value::Array(ArrayValue::from_elements(vec![
            number(1.0),
            number(2.0),
        ])));
        let result = call(&scope, "length", &[array]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 2.0);

        let result = call(&scope, "length", &[string("héllo")]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 5.0);

        assert!(matches!(
            call(&scope, "length", &[number(1.0)]),
            Err(RuntimeError::Type { .. })
        ));
    }

    #[test]
    fn id_returns_its_argument_handle() {
        let scope = globals();
        let value = string("x");
        let result = call(&scope, "id", &[Rc::clone(&value)]).unwrap();
        assert!(Rc::ptr_eq(&value, &result));
    }

    #[test]
    fn constant_builds_a_thunk() {
        let scope = globals();
        let thunk = call(&scope, "constant", &[number(42.0)]).unwrap();
        let result = call_function(&thunk, &scope, &[]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 42.0);
        // Extra arguments are ignored.
        let result = call_function(&thunk, &scope, &[number(0.0)]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 42.0);
    }

    #[test]
    fn bind_partially_applies() {
        let scope = globals();
        let atan2 = scope.value_of("atan2").unwrap();
        let bound = call(&scope, "bind", &[atan2, number(0.0)]).unwrap();
        let result = call_function(&bound, &scope, &[number(1.0)]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 0.0_f64.atan2(1.0));

        assert!(matches!(
            call(&scope, "bind", &[number(1.0)]),
            Err(RuntimeError::Type { .. })
        ));
    }

    #[test]
    fn compose_applies_right_to_left() {
        let scope = globals();
        let sqrt = scope.value_of("sqrt").unwrap();
        let abs = scope.value_of("abs").unwrap();
        let composed = call(&scope, "compose", &[sqrt, abs]).unwrap();
        let result = call_function(&composed, &scope, &[number(-16.0)]).unwrap();
        assert_eq!(to_number(&result).unwrap(), 4.0);

        assert!(matches!(
            call(&scope, "compose", &[]),
            Err(RuntimeError::InvalidArgumentCount { .. })
        ));
    }
}
