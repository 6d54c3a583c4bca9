//! Error types for the guard crate.

use graphtrigger_index::IndexError;
use graphtrigger_model::{LockViolation, ModelError};
use graphtrigger_types::{EntityId, EventKind};
use std::path::PathBuf;
use thiserror::Error;

/// Why a commit was refused. Every rejection is final for its transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("{0}")]
    LockViolation(LockViolation),

    #[error("trigger '{trigger}' vetoed {event} of entity {entity}: {reason}")]
    TriggerVeto {
        trigger: String,
        event: EventKind,
        entity: EntityId,
        reason: String,
    },

    /// The storage engine listed one identity more than once.
    #[error("invalid change set: entity {entity} appears more than once")]
    InvalidChangeSet { entity: EntityId },

    /// A modification whose before and after snapshots are different
    /// entities.
    #[error("invalid change set: change of entity {previous} carries snapshot of entity {current}")]
    MismatchedChange { previous: EntityId, current: EntityId },
}

impl Rejection {
    /// Identity of the entity the rejection is about.
    pub fn entity(&self) -> EntityId {
        match self {
            Self::LockViolation(v) => v.entity,
            Self::TriggerVeto { entity, .. } | Self::InvalidChangeSet { entity } => *entity,
            Self::MismatchedChange { previous, .. } => *previous,
        }
    }

    /// Name of the trigger responsible, if one is known.
    pub fn trigger(&self) -> Option<&str> {
        match self {
            Self::LockViolation(v) => v.owner.as_deref(),
            Self::TriggerVeto { trigger, .. } => Some(trigger),
            Self::InvalidChangeSet { .. } | Self::MismatchedChange { .. } => None,
        }
    }
}

impl From<LockViolation> for Rejection {
    fn from(violation: LockViolation) -> Self {
        Self::LockViolation(violation)
    }
}

/// Result type for guard setup operations.
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors raised while configuring or assembling the trigger module.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid trigger manifest {path:?}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("duplicate trigger name '{0}'")]
    DuplicateTrigger(String),

    #[error("trigger '{trigger}' uses unknown handler '{handler}'")]
    UnknownHandler { trigger: String, handler: String },

    #[error("handler '{handler}' rejected its parameters: {reason}")]
    HandlerParams { handler: String, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
