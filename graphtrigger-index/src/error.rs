//! Error types for the trigger index.

use thiserror::Error;

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur in index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Backend failure (SQLite, poisoned lock).
    #[error("index storage error: {0}")]
    Storage(String),

    /// No trigger entity is registered under the label.
    #[error("no trigger entities indexed under label '{label}'")]
    NotFound { label: String },

    /// A stored id could not be parsed back.
    #[error("corrupt index entry: {0}")]
    Corrupt(String),
}
