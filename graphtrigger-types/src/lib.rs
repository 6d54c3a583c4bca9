//! Core type definitions for graphtrigger.
//!
//! This crate defines the plugin-agnostic types shared by every other crate
//! in the workspace:
//! - Entity identifiers (UUID v7)
//! - Dynamically typed property values
//! - The event kinds a trigger can react to
//!
//! Nothing here knows about triggers, locks or transactions.

mod event;
mod ids;
mod value;

pub use event::EventKind;
pub use ids::EntityId;
pub use value::PropertyValue;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("unsupported property value: {0}")]
    UnsupportedValue(String),
}
