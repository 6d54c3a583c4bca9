use crate::Entity;
use graphtrigger_types::{EntityId, EventKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A modified entity: the snapshot before and after the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub previous: Entity,
    pub current: Entity,
}

impl Change {
    pub fn new(previous: Entity, current: Entity) -> Self {
        Self { previous, current }
    }

    pub fn id(&self) -> EntityId {
        self.current.id
    }

    /// True when both snapshots are equal in labels and properties.
    pub fn is_noop(&self) -> bool {
        self.previous.labels == self.current.labels
            && self.previous.properties == self.current.properties
    }
}

/// Everything one transaction is about to commit.
///
/// Built by the storage engine right before commit and discarded after the
/// guard has looked at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub created: Vec<Entity>,
    #[serde(default)]
    pub deleted: Vec<Entity>,
    #[serde(default)]
    pub changed: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_created(mut self, entity: Entity) -> Self {
        self.created.push(entity);
        self
    }

    #[must_use]
    pub fn with_deleted(mut self, entity: Entity) -> Self {
        self.deleted.push(entity);
        self
    }

    #[must_use]
    pub fn with_changed(mut self, previous: Entity, current: Entity) -> Self {
        self.changed.push(Change::new(previous, current));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.changed.is_empty()
    }

    /// Total number of touched entities.
    pub fn len(&self) -> usize {
        self.created.len() + self.deleted.len() + self.changed.len()
    }

    /// Number of entities touched by one kind of event.
    pub fn count(&self, event: EventKind) -> usize {
        match event {
            EventKind::Create => self.created.len(),
            EventKind::Modify => self.changed.len(),
            EventKind::Delete => self.deleted.len(),
        }
    }

    /// First identity that appears more than once across the three
    /// collections.
    pub fn duplicate_identity(&self) -> Option<EntityId> {
        let mut seen = BTreeSet::new();
        self.created
            .iter()
            .chain(&self.deleted)
            .map(|e| e.id)
            .chain(self.changed.iter().map(Change::id))
            .find(|id| !seen.insert(*id))
    }

    /// First change whose two snapshots disagree on identity.
    pub fn mismatched_change(&self) -> Option<&Change> {
        self.changed.iter().find(|c| c.previous.id != c.current.id)
    }
}
