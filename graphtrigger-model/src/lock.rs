//! Lock declarations: property and label names that may only change through
//! trigger callbacks, never directly from client code sharing the same
//! transaction.

use crate::interest::{label_changed, property_changed};
use crate::Entity;
use graphtrigger_types::{EntityId, EventKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a lock protects a property or a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockKind {
    Property,
    Label,
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => f.write_str("property"),
            Self::Label => f.write_str("label"),
        }
    }
}

/// One locked name, with the trigger that declared it (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Locked property and label names for one event kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSet {
    #[serde(default)]
    properties: Vec<LockEntry>,
    #[serde(default)]
    labels: Vec<LockEntry>,
}

impl LockSet {
    pub fn properties(&self) -> &[LockEntry] {
        &self.properties
    }

    pub fn labels(&self) -> &[LockEntry] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.labels.is_empty()
    }

    pub fn locks_property(&self, name: &str) -> bool {
        self.properties.iter().any(|e| e.name == name)
    }

    pub fn locks_label(&self, label: &str) -> bool {
        self.labels.iter().any(|e| e.name == label)
    }

    /// Adds an entry unless the name is already locked. The first
    /// declaration keeps the owner attribution.
    fn insert(&mut self, kind: LockKind, name: String, owner: Option<String>) {
        let entries = match kind {
            LockKind::Property => &mut self.properties,
            LockKind::Label => &mut self.labels,
        };
        if !entries.iter().any(|e| e.name == name) {
            entries.push(LockEntry { name, owner });
        }
    }

    fn merge(&mut self, other: &LockSet, owner: Option<&str>) {
        for entry in &other.properties {
            let owner = entry.owner.clone().or_else(|| owner.map(str::to_string));
            self.insert(LockKind::Property, entry.name.clone(), owner);
        }
        for entry in &other.labels {
            let owner = entry.owner.clone().or_else(|| owner.map(str::to_string));
            self.insert(LockKind::Label, entry.name.clone(), owner);
        }
    }
}

/// Lock sets for create, modify and delete, plus the label-enforcement
/// switch.
///
/// Label locks are checked only while `enforce_labels` is set (the default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPolicy {
    #[serde(default)]
    create: LockSet,
    #[serde(default)]
    modify: LockSet,
    #[serde(default)]
    delete: LockSet,
    #[serde(default = "default_enforce_labels")]
    enforce_labels: bool,
}

fn default_enforce_labels() -> bool {
    true
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            create: LockSet::default(),
            modify: LockSet::default(),
            delete: LockSet::default(),
            enforce_labels: default_enforce_labels(),
        }
    }
}

impl LockPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks a property for the given event.
    #[must_use]
    pub fn lock_property(mut self, event: EventKind, name: impl Into<String>) -> Self {
        self.set_mut(event).insert(LockKind::Property, name.into(), None);
        self
    }

    /// Locks a label for the given event.
    #[must_use]
    pub fn lock_label(mut self, event: EventKind, label: impl Into<String>) -> Self {
        self.set_mut(event).insert(LockKind::Label, label.into(), None);
        self
    }

    /// Locks a property on create, modify and delete at once.
    #[must_use]
    pub fn lock_property_everywhere(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.lock_property(EventKind::Create, name.clone())
            .lock_property(EventKind::Modify, name.clone())
            .lock_property(EventKind::Delete, name)
    }

    #[must_use]
    pub fn with_label_enforcement(mut self, enabled: bool) -> Self {
        self.enforce_labels = enabled;
        self
    }

    pub fn enforces_labels(&self) -> bool {
        self.enforce_labels
    }

    pub fn set(&self, event: EventKind) -> &LockSet {
        match event {
            EventKind::Create => &self.create,
            EventKind::Modify => &self.modify,
            EventKind::Delete => &self.delete,
        }
    }

    fn set_mut(&mut self, event: EventKind) -> &mut LockSet {
        match event {
            EventKind::Create => &mut self.create,
            EventKind::Modify => &mut self.modify,
            EventKind::Delete => &mut self.delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.modify.is_empty() && self.delete.is_empty()
    }

    /// Folds another policy's locks into this one. Entries without an owner
    /// are attributed to `owner`. The enforcement switch is left untouched.
    pub fn merge(&mut self, other: &LockPolicy, owner: Option<&str>) {
        self.create.merge(&other.create, owner);
        self.modify.merge(&other.modify, owner);
        self.delete.merge(&other.delete, owner);
    }

    /// First lock a newly created entity violates, if any.
    pub fn check_created(&self, entity: &Entity) -> Option<LockViolation> {
        self.check_present(EventKind::Create, &self.create, entity)
    }

    /// First lock a deleted entity (pre-delete snapshot) violates, if any.
    pub fn check_deleted(&self, entity: &Entity) -> Option<LockViolation> {
        self.check_present(EventKind::Delete, &self.delete, entity)
    }

    /// First lock a modification violates, if any.
    ///
    /// A locked property violates when it was removed, added or changed in
    /// value. A locked label violates when it was added or removed.
    pub fn check_modified(&self, previous: &Entity, current: &Entity) -> Option<LockViolation> {
        for entry in &self.modify.properties {
            if property_changed(previous, current, &entry.name) {
                return Some(LockViolation::new(
                    EventKind::Modify,
                    LockKind::Property,
                    entry,
                    current.id,
                ));
            }
        }

        if self.enforce_labels {
            for entry in &self.modify.labels {
                if label_changed(previous, current, &entry.name) {
                    return Some(LockViolation::new(
                        EventKind::Modify,
                        LockKind::Label,
                        entry,
                        current.id,
                    ));
                }
            }
        }

        None
    }

    fn check_present(&self, phase: EventKind, set: &LockSet, entity: &Entity) -> Option<LockViolation> {
        for entry in &set.properties {
            if entity.has_property(&entry.name) {
                return Some(LockViolation::new(phase, LockKind::Property, entry, entity.id));
            }
        }

        if self.enforce_labels {
            for entry in &set.labels {
                if entity.has_label(&entry.name) {
                    return Some(LockViolation::new(phase, LockKind::Label, entry, entity.id));
                }
            }
        }

        None
    }
}

/// A mutation of a locked property or label outside the framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockViolation {
    pub phase: EventKind,
    pub kind: LockKind,
    pub name: String,
    pub entity: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl LockViolation {
    fn new(phase: EventKind, kind: LockKind, entry: &LockEntry, entity: EntityId) -> Self {
        Self {
            phase,
            kind,
            name: entry.name.clone(),
            entity,
            owner: entry.owner.clone(),
        }
    }
}

impl fmt::Display for LockViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.phase {
            EventKind::Create => "creating",
            EventKind::Modify => "modifying",
            EventKind::Delete => "deleting",
        };
        write!(
            f,
            "{action} entity {} with locked {} '{}' blocked by trigger framework",
            self.entity, self.kind, self.name
        )?;
        if let Some(owner) = &self.owner {
            write!(f, " (locked by '{owner}')")?;
        }
        Ok(())
    }
}
