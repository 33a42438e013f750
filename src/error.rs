//! Error kinds surfaced by the record store. The pure engines (filter, sort,
//! stats, CSV) never fail, so this is the only domain error type; the
//! application layer wraps it in `anyhow` with context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    Validation(String),

    /// Update referenced an identifier that does not exist.
    #[error("Book {0} not found.")]
    NotFound(i64),

    /// The underlying SQLite operation failed (disk, quota, corruption).
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The data directory could not be prepared.
    #[error("storage failure: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    /// True for errors caused by user input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(self, StoreError::Validation(_) | StoreError::NotFound(_))
    }
}
