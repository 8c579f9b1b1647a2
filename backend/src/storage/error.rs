//! Storage error taxonomy.
//!
//! The engine relies on exactly one distinction: a duplicate-key conflict
//! on insert means another caller won a creation race and the row should
//! be re-read, while every other failure is fatal to the current request.

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An insert hit a unique constraint. Expected under concurrent
    /// creation; resolved by re-reading the winner's row, never surfaced
    /// to callers as a failure.
    #[error("duplicate key on {constraint}")]
    DuplicateKey { constraint: &'static str },

    /// Any other storage failure, wrapped with the operation that caused it.
    /// The cause is folded into the message rather than exposed as a
    /// `source()`, since `anyhow::Error` is not itself a `std::error::Error`.
    #[error("storage failure during {operation}: {cause}")]
    Backend {
        operation: &'static str,
        cause: anyhow::Error,
    },
}

impl StorageError {
    pub fn backend(operation: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        StorageError::Backend {
            operation,
            cause: cause.into(),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StorageError::DuplicateKey { .. })
    }
}
