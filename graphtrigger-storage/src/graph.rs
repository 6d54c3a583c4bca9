use crate::GraphTransaction;
use graphtrigger_guard::{EntitySource, ScanError};
use graphtrigger_model::{ChangeSet, Entity};
use graphtrigger_types::EntityId;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Ordered in-memory entity store.
///
/// Reads see only committed state. Writes go through [`GraphTransaction`].
#[derive(Debug, Default)]
pub struct MemoryGraph {
    entities: RwLock<BTreeMap<EntityId, Entity>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store without running any hook.
    pub fn with_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let entities = entities.into_iter().map(|e| (e.id, e)).collect();
        Self {
            entities: RwLock::new(entities),
        }
    }

    pub fn begin(&self) -> GraphTransaction<'_> {
        GraphTransaction::new(self)
    }

    pub fn get(&self, id: EntityId) -> Option<Entity> {
        self.read().get(&id).cloned()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All committed entities, ordered by id.
    pub fn entities(&self) -> Vec<Entity> {
        self.read().values().cloned().collect()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, BTreeMap<EntityId, Entity>> {
        self.entities.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<EntityId, Entity>> {
        self.entities.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies an accepted change set. Caller holds the write guard.
    pub(crate) fn apply(entities: &mut BTreeMap<EntityId, Entity>, changes: &ChangeSet) {
        for entity in &changes.created {
            entities.insert(entity.id, entity.clone());
        }
        for entity in &changes.deleted {
            entities.remove(&entity.id);
        }
        for change in &changes.changed {
            entities.insert(change.id(), change.current.clone());
        }
        debug!(
            created = changes.created.len(),
            deleted = changes.deleted.len(),
            changed = changes.changed.len(),
            "transaction applied"
        );
    }
}

impl EntitySource for MemoryGraph {
    fn batch(&self, offset: usize, limit: usize) -> Result<Vec<Entity>, ScanError> {
        Ok(self.read().values().skip(offset).take(limit).cloned().collect())
    }
}
