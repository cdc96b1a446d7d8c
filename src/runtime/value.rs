use crate::language::ast::Node;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::scope::ScopeRef;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a runtime value. Null, Boolean and Number are copied
/// into a fresh handle whenever they are bound (call-by-value); String,
/// Array, Object and Function share the handle (call-by-sharing), so
/// container mutation is visible through every alias.
pub type ValueRef = Rc<Value>;

pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(ArrayValue),
    Object(ObjectValue),
    Function(FunctionValue),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Function(_) => "Function",
        }
    }
}

pub fn null() -> ValueRef {
    Rc::new(Value::Null)
}

pub fn boolean(value: bool) -> ValueRef {
    Rc::new(Value::Boolean(value))
}

pub fn number(value: f64) -> ValueRef {
    Rc::new(Value::Number(value))
}

pub fn string(value: impl Into<String>) -> ValueRef {
    Rc::new(Value::String(value.into()))
}

/// Apply the binding discipline: primitives are copied into a fresh
/// handle, reference kinds keep sharing theirs.
pub fn copy_value(value: &ValueRef) -> ValueRef {
    match &**value {
        Value::Null => null(),
        Value::Boolean(b) => boolean(*b),
        Value::Number(n) => number(*n),
        Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Function(_) => {
            Rc::clone(value)
        }
    }
}

// The coercions are strict: a kind mismatch is a TypeError, never an
// implicit conversion.

pub fn to_number(value: &Value) -> RuntimeResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::type_error(format!(
            "expected Number, found {}",
            other.type_name()
        ))),
    }
}

pub fn to_boolean(value: &Value) -> RuntimeResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(RuntimeError::type_error(format!(
            "expected Boolean, found {}",
            other.type_name()
        ))),
    }
}

pub fn to_string_value(value: &Value) -> RuntimeResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(RuntimeError::type_error(format!(
            "expected String, found {}",
            other.type_name()
        ))),
    }
}

pub struct ArrayValue {
    elements: RefCell<Vec<ValueRef>>,
}

impl ArrayValue {
    pub fn from_elements(elements: Vec<ValueRef>) -> Self {
        Self {
            elements: RefCell::new(elements),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Element at a subscript index, after flooring. Reads outside the
    /// array fail the same way writes do.
    pub fn get(&self, index: f64) -> RuntimeResult<ValueRef> {
        let at = self.checked_index(index)?;
        Ok(Rc::clone(&self.elements.borrow()[at]))
    }

    pub fn set(&self, index: f64, value: ValueRef) -> RuntimeResult<()> {
        let at = self.checked_index(index)?;
        self.elements.borrow_mut()[at] = value;
        Ok(())
    }

    pub fn push(&self, value: ValueRef) {
        self.elements.borrow_mut().push(value);
    }

    pub fn element_at(&self, position: usize) -> Option<ValueRef> {
        self.elements.borrow().get(position).cloned()
    }

    fn checked_index(&self, index: f64) -> RuntimeResult<usize> {
        let length = self.len();
        let floored = index.floor();
        if floored < 0.0 || floored >= length as f64 {
            return Err(RuntimeError::OutOfBounds {
                index: floored as i64,
                length,
            });
        }
        Ok(floored as usize)
    }
}

pub struct ObjectValue {
    entries: RefCell<HashMap<String, ValueRef>>,
}

impl ObjectValue {
    pub fn from_entries(entries: Vec<(String, ValueRef)>) -> Self {
        Self {
            entries: RefCell::new(entries.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Missing keys read as Null.
    pub fn get(&self, key: &str) -> ValueRef {
        self.entries
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_else(null)
    }

    /// Writing to a missing key creates it.
    pub fn set(&self, key: impl Into<String>, value: ValueRef) {
        self.entries.borrow_mut().insert(key.into(), value);
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// Subscript keys for objects: strings index directly, numbers index by
/// their rendered text. Anything else is not a property.
pub fn object_key(index: &Value) -> RuntimeResult<String> {
    match index {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(format_number(*n)),
        other => Err(RuntimeError::InvalidProperty {
            property: format!("{other}"),
            value_type: "Object",
        }),
    }
}

pub type BuiltinBehavior = Rc<dyn Fn(&ScopeRef, &[ValueRef]) -> RuntimeResult<ValueRef>>;

pub enum FunctionValue {
    User(UserFunction),
    Builtin(BuiltinFunction),
}

pub struct UserFunction {
    pub parameters: Vec<String>,
    pub body: Rc<Node>,
    /// The runtime scope in effect where the `func` expression was
    /// evaluated; calls bind arguments in a fresh child of this.
    pub captured: ScopeRef,
}

pub struct BuiltinFunction {
    pub name: String,
    pub behavior: BuiltinBehavior,
}

impl FunctionValue {
    pub fn display_name(&self) -> &str {
        match self {
            FunctionValue::User(_) => "function",
            FunctionValue::Builtin(builtin) => &builtin.name,
        }
    }
}

/// Render a Number the way the language prints it: integral values drop
/// the fractional point.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(array) => {
                write!(f, "[")?;
                let elements = array.elements.borrow();
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => {
                write!(f, "{{")?;
                let entries = object.entries.borrow();
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Function(function) => write!(f, "<{}>", function.display_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_discipline_splits_primitives_and_shares_references() {
        let n = number(1.0);
        assert!(!Rc::ptr_eq(&n, &copy_value(&n)));

        let array: ValueRef = Rc::new(Value::Array(ArrayValue::from_elements(vec![])));
        assert!(Rc::ptr_eq(&array, &copy_value(&array)));

        let s = string("abc");
        assert!(Rc::ptr_eq(&s, &copy_value(&s)));
    }

    #[test]
    fn coercions_are_strict() {
        assert_eq!(to_number(&Value::Number(2.5)).unwrap(), 2.5);
        assert!(to_number(&Value::String("1".into())).is_err());
        assert!(to_boolean(&Value::Number(1.0)).is_err());
        assert!(to_string_value(&Value::Null).is_err());
    }

    #[test]
    fn array_subscripts_floor_and_bounds_check() {
        let array = ArrayValue::from_elements(vec![number(10.0), number(20.0)]);
        assert_eq!(to_number(&array.get(1.9).unwrap()).unwrap(), 20.0);
        assert!(matches!(
            array.get(2.0),
            Err(RuntimeError::OutOfBounds { index: 2, length: 2 })
        ));
        assert!(matches!(
            array.set(-1.0, null()),
            Err(RuntimeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn object_reads_default_to_null_and_writes_create() {
        let object = ObjectValue::from_entries(vec![]);
        assert!(matches!(&*object.get("missing"), Value::Null));
        object.set("k", number(5.0));
        assert_eq!(to_number(&object.get("k")).unwrap(), 5.0);
    }

    #[test]
    fn numeric_object_keys_render_as_text() {
        assert_eq!(object_key(&Value::Number(1.0)).unwrap(), "1");
        assert_eq!(object_key(&Value::Number(2.5)).unwrap(), "2.5");
        assert!(object_key(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn display_renders_like_source() {
        let array = Value::Array(ArrayValue::from_elements(vec![
            number(1.0),
            string("x"),
            null(),
        ]));
        assert_eq!(array.to_string(), "[1, x, null]");
        assert_eq!(Value::Number(14.0).to_string(), "14");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }
}
