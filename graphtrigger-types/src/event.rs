//! The mutation events a trigger can subscribe to.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happened to an entity inside a transaction.
///
/// `Change` is not a separate kind: "any change" subscribers receive one of
/// these three together with the before/after snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The entity exists only in the post-commit state.
    Create,
    /// The entity exists in both states and may differ.
    Modify,
    /// The entity exists only in the pre-commit state.
    Delete,
}

impl EventKind {
    /// All kinds, in dispatch-independent declaration order.
    pub const ALL: [EventKind; 3] = [EventKind::Create, EventKind::Modify, EventKind::Delete];

    /// Stable numeric code (create = 0, modify = 1, delete = 2).
    pub const fn code(self) -> u8 {
        match self {
            Self::Create => 0,
            Self::Modify => 1,
            Self::Delete => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "modify" | "update" => Ok(Self::Modify),
            "delete" => Ok(Self::Delete),
            other => Err(Error::UnknownEventKind(other.to_string())),
        }
    }
}
