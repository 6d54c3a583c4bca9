//! Error types for the storage layer.

use graphtrigger_guard::Rejection;
use graphtrigger_types::EntityId;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entity not found (or already deleted in this transaction).
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// An entity with this id already exists.
    #[error("entity already exists: {0}")]
    AlreadyExists(EntityId),

    /// The commit hook refused the transaction. Nothing was applied.
    #[error("transaction rejected: {0}")]
    Rejected(#[from] Rejection),
}
