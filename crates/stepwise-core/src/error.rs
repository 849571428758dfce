//! Error types for stepwise-core

use thiserror::Error;

/// Core error type
///
/// Errors raised by behaviors are captured into an [`Effect`](crate::Effect),
/// so this type is `Clone` and comparable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Behavior raised: {0}")]
    Raised(String),

    #[error("Behavior panicked: {0}")]
    Panicked(String),
}

impl Error {
    /// Create a behavior failure from any displayable reason
    pub fn raised(reason: impl std::fmt::Display) -> Self {
        Error::Raised(reason.to_string())
    }

    /// Create a type mismatch error
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
