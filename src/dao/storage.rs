use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be reached or answered with an unusable response.
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// No row matched the lookup.
    #[error("{table} row `{id}` not found")]
    NotFound { table: &'static str, id: i64 },
    /// More rows than expected matched a lookup on a key assumed unique.
    #[error("{table} has {count} rows for `{id}`, expected exactly one")]
    Conflict {
        table: &'static str,
        id: i64,
        count: usize,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
