use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("object identifier must not be empty")]
    EmptyIdentifier,

    #[error("invalid object identifier {0:?}: contains whitespace")]
    InvalidIdentifier(String),

    #[error("unexpected value: expected {expected}, found {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },
}
