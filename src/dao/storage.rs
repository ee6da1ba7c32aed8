use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying service.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The stored document moved since the caller last read it.
    #[error("league document changed remotely (expected version {expected}, found {actual})")]
    Conflict { expected: String, actual: String },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a version conflict error.
    pub fn conflict(expected: impl Into<String>, actual: Option<String>) -> Self {
        StorageError::Conflict {
            expected: expected.into(),
            actual: actual.unwrap_or_else(|| "none".into()),
        }
    }
}
