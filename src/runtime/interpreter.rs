use crate::language::ast::{Node, NodeKind};
use crate::language::builtin::{self, Builtin};
use crate::language::scope::IdentifierInfo;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::scope::ScopeRef;
use crate::runtime::value::{
    ArrayValue, BuiltinFunction, FunctionValue, ObjectValue, UserFunction, Value, ValueRef,
    boolean, copy_value, null, number, object_key, string, to_boolean, to_number,
};
use std::rc::Rc;

/// Non-local control transfer, threaded through evaluation results instead
/// of a value kind so user code can never observe it.
pub enum FlowSignal {
    Return(ValueRef),
    Break,
    Continue,
}

pub enum Eval {
    Value(ValueRef),
    Flow(FlowSignal),
}

/// Unwrap a child evaluation to its value, propagating control flow to the
/// caller's caller.
macro_rules! eval_value {
    ($node:expr, $scope:expr) => {
        match $node.evaluate($scope)? {
            Eval::Value(value) => value,
            Eval::Flow(flow) => return Ok(Eval::Flow(flow)),
        }
    };
}

impl Node {
    pub fn evaluate(&self, scope: &ScopeRef) -> RuntimeResult<Eval> {
        match &self.kind {
            NodeKind::Identifier(name) => match scope.value_of(name) {
                Some(value) => Ok(Eval::Value(value)),
                None => Err(RuntimeError::UndefinedVariable { name: name.clone() }),
            },
            NodeKind::NumberLiteral(value) => Ok(Eval::Value(number(*value))),
            NodeKind::StringLiteral(value) => Ok(Eval::Value(string(value.clone()))),
            NodeKind::BooleanLiteral(value) => Ok(Eval::Value(boolean(*value))),
            NodeKind::NullLiteral => Ok(Eval::Value(null())),

            NodeKind::ArrayLiteral { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(copy_value(&eval_value!(element, scope)));
                }
                Ok(Eval::Value(Rc::new(Value::Array(
                    ArrayValue::from_elements(values),
                ))))
            }

            NodeKind::ObjectLiteral { entries } => {
                let mut values = Vec::with_capacity(entries.len());
                for (key, entry) in entries {
                    values.push((key.clone(), copy_value(&eval_value!(entry, scope))));
                }
                Ok(Eval::Value(Rc::new(Value::Object(
                    ObjectValue::from_entries(values),
                ))))
            }

            NodeKind::Subscript { target, index } => {
                let target = eval_value!(target, scope);
                let index = eval_value!(index, scope);
                match &*target {
                    Value::Array(array) => match &*index {
                        Value::Number(at) => Ok(Eval::Value(array.get(*at)?)),
                        Value::String(member) => {
                            Ok(Eval::Value(array_member(&target, member)?))
                        }
                        other => Err(RuntimeError::InvalidProperty {
                            property: other.to_string(),
                            value_type: "Array",
                        }),
                    },
                    Value::Object(object) => {
                        let key = object_key(&index)?;
                        Ok(Eval::Value(object.get(&key)))
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "cannot subscript {}",
                        other.type_name()
                    ))),
                }
            }

            NodeKind::AccessMember { target, member } => {
                let target = eval_value!(target, scope);
                match &*target {
                    Value::Array(_) => Ok(Eval::Value(array_member(&target, member)?)),
                    Value::Object(object) => Ok(Eval::Value(object.get(member))),
                    other => Err(RuntimeError::type_error(format!(
                        "cannot access members of {}",
                        other.type_name()
                    ))),
                }
            }

            NodeKind::BinaryOperator { op, left, right } => {
                self.eval_binary(*op, left, right, scope)
            }
            NodeKind::UnaryOperator { op, operand } => self.eval_unary(*op, operand, scope),

            NodeKind::FunctionCall { callee, arguments } => {
                let callee = eval_value!(callee, scope);
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(copy_value(&eval_value!(argument, scope)));
                }
                call_function(&callee, scope, &values).map(Eval::Value)
            }

            NodeKind::Block {
                statements,
                introduces_scope,
            } => {
                let block_scope = if *introduces_scope {
                    scope.child()
                } else {
                    scope.clone()
                };
                for statement in statements {
                    if let Eval::Flow(flow) = statement.evaluate(&block_scope)? {
                        return Ok(Eval::Flow(flow));
                    }
                }
                Ok(Eval::Value(null()))
            }

            NodeKind::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = eval_value!(condition, scope);
                if to_boolean(&condition)? {
                    then_branch.evaluate(&scope.child())
                } else if let Some(else_branch) = else_branch {
                    else_branch.evaluate(&scope.child())
                } else {
                    Ok(Eval::Value(null()))
                }
            }

            NodeKind::WhileStatement { condition, body } => {
                loop {
                    let condition = eval_value!(condition, scope);
                    if !to_boolean(&condition)? {
                        break;
                    }
                    match body.evaluate(&scope.child())? {
                        Eval::Value(_) => {}
                        Eval::Flow(FlowSignal::Break) => break,
                        Eval::Flow(FlowSignal::Continue) => continue,
                        Eval::Flow(flow @ FlowSignal::Return(_)) => return Ok(Eval::Flow(flow)),
                    }
                }
                Ok(Eval::Value(null()))
            }

            NodeKind::ForStatement {
                is_const,
                binding,
                iterable,
                body,
            } => {
                let iterable = eval_value!(iterable, scope);
                let Value::Array(array) = &*iterable else {
                    return Err(RuntimeError::type_error(format!(
                        "for loop requires an Array, found {}",
                        iterable.type_name()
                    )));
                };

                let mut position = 0;
                loop {
                    // Indexed against the live array so growth and
                    // shrinkage during iteration stay observable.
                    let Some(element) = array.element_at(position) else {
                        break;
                    };
                    position += 1;

                    let frame = scope.child();
                    frame.declare(
                        binding,
                        IdentifierInfo {
                            is_const: *is_const,
                        },
                        copy_value(&element),
                    )?;
                    match body.evaluate(&frame)? {
                        Eval::Value(_) => {}
                        Eval::Flow(FlowSignal::Break) => break,
                        Eval::Flow(FlowSignal::Continue) => continue,
                        Eval::Flow(flow @ FlowSignal::Return(_)) => return Ok(Eval::Flow(flow)),
                    }
                }
                Ok(Eval::Value(null()))
            }

            NodeKind::Declaration {
                is_const,
                name,
                initializer,
            } => {
                let value = match initializer {
                    Some(initializer) => copy_value(&eval_value!(initializer, scope)),
                    None => null(),
                };
                scope.declare(
                    name,
                    IdentifierInfo {
                        is_const: *is_const,
                    },
                    value,
                )?;
                Ok(Eval::Value(null()))
            }

            NodeKind::FunctionDeclaration { parameters, body } => Ok(Eval::Value(Rc::new(
                Value::Function(FunctionValue::User(UserFunction {
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    captured: scope.clone(),
                })),
            ))),

            NodeKind::Return { value } => {
                let value = match value {
                    Some(value) => eval_value!(value, scope),
                    None => null(),
                };
                Ok(Eval::Flow(FlowSignal::Return(value)))
            }
            NodeKind::Break => Ok(Eval::Flow(FlowSignal::Break)),
            NodeKind::Continue => Ok(Eval::Flow(FlowSignal::Continue)),
        }
    }

    /// Store `rhs` into the location this node denotes. The parser only
    /// routes lvalues here; anything else is a bug assertion.
    pub fn assign(&self, scope: &ScopeRef, rhs: ValueRef) -> RuntimeResult<Eval> {
        match &self.kind {
            NodeKind::Identifier(name) => {
                scope.set_value(name, rhs)?;
                Ok(Eval::Value(null()))
            }

            NodeKind::Subscript { target, index } => {
                let target = eval_value!(target, scope);
                let index = eval_value!(index, scope);
                match &*target {
                    Value::Array(array) => match &*index {
                        Value::Number(at) => {
                            array.set(*at, rhs)?;
                            Ok(Eval::Value(null()))
                        }
                        other => Err(RuntimeError::InvalidProperty {
                            property: other.to_string(),
                            value_type: "Array",
                        }),
                    },
                    Value::Object(object) => {
                        let key = object_key(&index)?;
                        object.set(key, rhs);
                        Ok(Eval::Value(null()))
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "cannot subscript {}",
                        other.type_name()
                    ))),
                }
            }

            NodeKind::AccessMember { target, member } => {
                let target = eval_value!(target, scope);
                match &*target {
                    Value::Object(object) => {
                        object.set(member.clone(), rhs);
                        Ok(Eval::Value(null()))
                    }
                    Value::Array(_) => Err(RuntimeError::InvalidProperty {
                        property: member.clone(),
                        value_type: "Array",
                    }),
                    other => Err(RuntimeError::type_error(format!(
                        "cannot access members of {}",
                        other.type_name()
                    ))),
                }
            }

            _ => Err(RuntimeError::interpreter(
                "assignment target is not an lvalue",
            )),
        }
    }

    fn eval_binary(
        &self,
        op: Builtin,
        left: &Rc<Node>,
        right: &Rc<Node>,
        scope: &ScopeRef,
    ) -> RuntimeResult<Eval> {
        if builtin::is_assignment_operator(builtin::info(op)) {
            let rhs = eval_value!(right, scope);
            let new_value = match builtin::compound_assignment_arithmetic(op) {
                Some(arithmetic) => {
                    let current = eval_value!(left, scope);
                    number(apply_arithmetic(
                        arithmetic,
                        to_number(&current)?,
                        to_number(&rhs)?,
                    )?)
                }
                None => copy_value(&rhs),
            };
            // An assignment expression's own result is Null.
            return left.assign(scope, new_value);
        }

        // `and`/`or` decide on the left operand alone when they can.
        match op {
            Builtin::LogicalAnd => {
                let lhs = eval_value!(left, scope);
                if !to_boolean(&lhs)? {
                    return Ok(Eval::Value(boolean(false)));
                }
                let rhs = eval_value!(right, scope);
                return Ok(Eval::Value(boolean(to_boolean(&rhs)?)));
            }
            Builtin::LogicalOr => {
                let lhs = eval_value!(left, scope);
                if to_boolean(&lhs)? {
                    return Ok(Eval::Value(boolean(true)));
                }
                let rhs = eval_value!(right, scope);
                return Ok(Eval::Value(boolean(to_boolean(&rhs)?)));
            }
            _ => {}
        }

        let lhs = eval_value!(left, scope);
        let rhs = eval_value!(right, scope);
        let a = to_number(&lhs)?;
        let b = to_number(&rhs)?;

        let result = match op {
            Builtin::Addition
            | Builtin::Subtraction
            | Builtin::Multiplication
            | Builtin::Division
            | Builtin::Modulus
            | Builtin::Exponent => number(apply_arithmetic(op, a, b)?),

            Builtin::LessThan => boolean(a < b),
            Builtin::LessThanOrEqual => boolean(a <= b),
            Builtin::GreaterThan => boolean(a > b),
            Builtin::GreaterThanOrEqual => boolean(a >= b),
            Builtin::EqualTo => boolean(a == b),
            Builtin::NotEqualTo => boolean(a != b),

            other => {
                return Err(RuntimeError::interpreter(format!(
                    "binary operator not implemented: {}",
                    builtin::canonical_text(other)
                )));
            }
        };
        Ok(Eval::Value(result))
    }

    fn eval_unary(&self, op: Builtin, operand: &Rc<Node>, scope: &ScopeRef) -> RuntimeResult<Eval> {
        match op {
            Builtin::Negation => {
                let value = eval_value!(operand, scope);
                Ok(Eval::Value(number(-to_number(&value)?)))
            }
            Builtin::LogicalNot => {
                let value = eval_value!(operand, scope);
                Ok(Eval::Value(boolean(!to_boolean(&value)?)))
            }
            Builtin::Increment | Builtin::Decrement => {
                let current = eval_value!(operand, scope);
                let delta = if op == Builtin::Increment { 1.0 } else { -1.0 };
                let new_value = number(to_number(&current)? + delta);
                match operand.assign(scope, Rc::clone(&new_value))? {
                    Eval::Flow(flow) => Ok(Eval::Flow(flow)),
                    Eval::Value(_) => Ok(Eval::Value(new_value)),
                }
            }
            other => Err(RuntimeError::interpreter(format!(
                "unary operator not implemented: {}",
                builtin::canonical_text(other)
            ))),
        }
    }
}

fn apply_arithmetic(op: Builtin, a: f64, b: f64) -> RuntimeResult<f64> {
    match op {
        Builtin::Addition => Ok(a + b),
        Builtin::Subtraction => Ok(a - b),
        Builtin::Multiplication => Ok(a * b),
        Builtin::Division => Ok(a / b),
        Builtin::Modulus => Ok(a % b),
        Builtin::Exponent => Ok(a.powf(b)),
        other => Err(RuntimeError::interpreter(format!(
            "not an arithmetic operator: {}",
            builtin::canonical_text(other)
        ))),
    }
}

/// Call a value as a function, for both the evaluator and library builtins
/// like `bind` and `compose`.
pub fn call_function(
    callee: &ValueRef,
    scope: &ScopeRef,
    arguments: &[ValueRef],
) -> RuntimeResult<ValueRef> {
    let Value::Function(function) = &**callee else {
        return Err(RuntimeError::type_error(format!(
            "{} is not callable",
            callee.type_name()
        )));
    };

    match function {
        FunctionValue::Builtin(builtin) => (builtin.behavior)(scope, arguments),
        FunctionValue::User(user) => {
            if arguments.len() != user.parameters.len() {
                return Err(RuntimeError::InvalidArgumentCount {
                    function: "function".to_string(),
                    expected: user.parameters.len(),
                    received: arguments.len(),
                });
            }

            let frame = user.captured.child();
            for (parameter, argument) in user.parameters.iter().zip(arguments) {
                frame.declare(
                    parameter,
                    IdentifierInfo { is_const: false },
                    copy_value(argument),
                )?;
            }

            match user.body.evaluate(&frame)? {
                Eval::Flow(FlowSignal::Return(value)) => Ok(value),
                Eval::Flow(_) => Err(RuntimeError::interpreter(
                    "loop control escaped a function body",
                )),
                Eval::Value(_) => Ok(null()),
            }
        }
    }
}

/// Array members: read-only `length` and the `push` method, which appends
/// every argument it is given.
fn array_member(target: &ValueRef, member: &str) -> RuntimeResult<ValueRef> {
    let Value::Array(array) = &**target else {
        return Err(RuntimeError::interpreter("array member on non-array"));
    };

    match member {
        "length" => Ok(number(array.len() as f64)),
        "push" => {
            let receiver = Rc::clone(target);
            Ok(Rc::new(Value::Function(FunctionValue::Builtin(
                BuiltinFunction {
                    name: "push".to_string(),
                    behavior: Rc::new(move |_scope, arguments| {
                        let Value::Array(array) = &*receiver else {
                            return Err(RuntimeError::interpreter("push receiver is not an array"));
                        };
                        for argument in arguments {
                            array.push(copy_value(argument));
                        }
                        Ok(null())
                    }),
                },
            ))))
        }
        other => Err(RuntimeError::InvalidProperty {
            property: other.to_string(),
            value_type: "Array",
        }),
    }
}
