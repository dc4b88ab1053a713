//! Error handling for the matching engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Similarity backend unavailable: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Batch task failed: {0}")]
    BatchTask(String),
}

pub type Result<T> = std::result::Result<T, MatcherError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for MatcherError {
    fn from(err: anyhow::Error) -> Self {
        MatcherError::InvalidInput(err.to_string())
    }
}
