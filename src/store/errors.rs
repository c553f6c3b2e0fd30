//! # Store Errors

use thiserror::Error;

/// Result type for data store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Data store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Query names a table the store does not hold
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Dataset could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Dataset is not valid
    #[error("Parse error: {0}")]
    Parse(String),
}

impl StoreError {
    /// Store failures are always server-side
    pub fn status_code(&self) -> u16 {
        500
    }
}
