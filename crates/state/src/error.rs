//! Errors for the persistence layer and the state store.

use thiserror::Error;

/// Failures of the underlying key-value layer
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`StateStore`](crate::StateStore) operations
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Unknown proxy service: {0}")]
    UnknownService(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),
}

impl StateError {
    /// True when the in-memory change succeeded and only the write failed
    pub fn is_persistence(&self) -> bool {
        matches!(self, StateError::Storage(_))
    }
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;
