//! Error types for stepwise-hub

use thiserror::Error;

/// Result type for stepwise-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stepwise-hub
#[derive(Debug, Error)]
pub enum Error {
    /// No producers registered in the multiplexer
    #[error("no producers registered in multiplexer")]
    NoProducers,

    /// Multiplex configuration could not be parsed or applied
    #[error("invalid multiplex config: {0}")]
    Config(String),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] stepwise_core::Error),
}

impl From<ron::error::SpannedError> for Error {
    fn from(err: ron::error::SpannedError) -> Self {
        Error::Config(err.to_string())
    }
}
