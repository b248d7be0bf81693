use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum XdmError {
    #[error("XTTE0570: cannot cast '{value}' to {target}")]
    Casting { value: String, target: String },

    #[error("Cardinality error: {declared} does not allow a sequence of {actual} items")]
    Cardinality { declared: String, actual: usize },

    #[error("Index error: {0}")]
    IndexType(String),

    #[error("Arithmetic error: {0}")]
    ArithmeticDomain(String),

    #[error("Malformed {space} value '{value}'")]
    MalformedLexical { space: &'static str, value: String },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Dynamic error: {0}")]
    Dynamic(String),

    #[error("Function '{function}' error: {message}")]
    Function { function: String, message: String },

    #[error("Variable '${name}' not found")]
    UnknownVariable { name: String },

    #[error("Context item is required but not set")]
    NoContextItem,
}

impl XdmError {
    pub fn casting(value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Casting {
            value: value.into(),
            target: target.into(),
        }
    }

    pub fn cardinality(declared: impl Into<String>, actual: usize) -> Self {
        Self::Cardinality {
            declared: declared.into(),
            actual,
        }
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::IndexType(message.into())
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::ArithmeticDomain(message.into())
    }

    pub fn malformed(space: &'static str, value: impl Into<String>) -> Self {
        Self::MalformedLexical {
            space,
            value: value.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub fn dynamic_error(message: impl Into<String>) -> Self {
        Self::Dynamic(message.into())
    }

    pub fn function(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            function: function.into(),
            message: message.into(),
        }
    }
}
