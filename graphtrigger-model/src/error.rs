use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building model values.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("trigger name must not be empty")]
    EmptyTriggerName,

    #[error("invalid inclusion selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error(transparent)]
    Types(#[from] graphtrigger_types::Error),
}
