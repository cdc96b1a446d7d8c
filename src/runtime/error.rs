use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// The closed set of fatal evaluation failures. Every variant propagates
/// through the recursive evaluator untouched and surfaces to the driver;
/// there is no user-level catch.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("type error: {message}")]
    Type { message: String },
    #[error("index {index} is out of bounds for length {length}")]
    OutOfBounds { index: i64, length: usize },
    #[error("invalid property `{property}` on {value_type}")]
    InvalidProperty {
        property: String,
        value_type: &'static str,
    },
    #[error("undefined variable name: {name}")]
    UndefinedVariable { name: String },
    #[error("`{name}` is immutable, and cannot be assigned to")]
    ImmutableWrite { name: String },
    #[error("{function} expected {expected} arguments but received {received}")]
    InvalidArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("invalid declaration: {name} is already declared")]
    Declaration { name: String },
    #[error("interpreter bug: {message}")]
    Interpreter { message: String },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    pub fn interpreter(message: impl Into<String>) -> Self {
        Self::Interpreter {
            message: message.into(),
        }
    }
}
