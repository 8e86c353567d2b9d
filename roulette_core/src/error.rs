//! Error types for the roulette_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for roulette_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected exercise input (empty name, unknown difficulty, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The exercise store failed; in-memory state was left untouched
    #[error("Storage error: {0}")]
    Storage(String),

    /// An operation was invoked outside its contract (e.g. selecting from
    /// an empty eligible set)
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// No exercise with the given identifier
    #[error("Exercise not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Wrap any failure coming out of an exercise store as a storage error,
    /// keeping its message.
    pub fn into_storage(self) -> Self {
        match self {
            Error::Storage(_) | Error::NotFound(_) | Error::Validation(_) => self,
            other => Error::Storage(other.to_string()),
        }
    }
}
