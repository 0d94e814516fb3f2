use thiserror::Error;

/// Programmer errors raised while declaring or wiring components.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("attribute `{0}` is mapped by more than one field")]
    DuplicateAttribute(String),
    #[error("default for field `{field}` is not a {expected}")]
    DefaultTypeMismatch { field: String, expected: &'static str },
    #[error("value for field `{field}` is not a {expected}")]
    TypeMismatch { field: String, expected: &'static str },
    #[error("no field named `{0}`")]
    UnknownField(String),
    #[error("element already has an ancestor link on `{0}`")]
    AlreadyLinked(String),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Failure to turn an attribute string into a typed value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("`{0}` is not a number")]
    InvalidNumber(String),
    #[error("malformed JSON: {0}")]
    InvalidJson(String),
}
