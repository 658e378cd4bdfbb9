//! Errors raised while resolving services.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Unknown proxy service: {0}")]
    UnknownService(String),
}

/// Result type for encoding operations
pub type EncodeResult<T> = Result<T, EncodeError>;
