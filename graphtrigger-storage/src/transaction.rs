use crate::{MemoryGraph, StorageError, StorageResult};
use graphtrigger_guard::CommitHook;
use graphtrigger_model::{Change, ChangeSet, Entity};
use graphtrigger_types::{EntityId, PropertyValue};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Staged writes against a [`MemoryGraph`].
///
/// Nothing is visible to readers until [`commit`](Self::commit) succeeds.
/// Dropping the transaction discards it.
pub struct GraphTransaction<'g> {
    graph: &'g MemoryGraph,
    /// `None` marks an entity deleted in this transaction.
    staged: BTreeMap<EntityId, Option<Entity>>,
}

impl<'g> GraphTransaction<'g> {
    pub(crate) fn new(graph: &'g MemoryGraph) -> Self {
        Self {
            graph,
            staged: BTreeMap::new(),
        }
    }

    /// The entity as this transaction currently sees it.
    pub fn get(&self, id: EntityId) -> Option<Entity> {
        match self.staged.get(&id) {
            Some(staged) => staged.clone(),
            None => self.graph.get(id),
        }
    }

    pub fn create(&mut self, entity: Entity) -> StorageResult<EntityId> {
        let id = entity.id;
        if self.get(id).is_some() {
            return Err(StorageError::AlreadyExists(id));
        }
        trace!(entity = %id, "staging create");
        self.staged.insert(id, Some(entity));
        Ok(id)
    }

    pub fn set_property(
        &mut self,
        id: EntityId,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> StorageResult<()> {
        self.update(id, |e| {
            e.set_property(name, value);
        })
    }

    pub fn remove_property(&mut self, id: EntityId, name: &str) -> StorageResult<()> {
        self.update(id, |e| {
            e.remove_property(name);
        })
    }

    pub fn add_label(&mut self, id: EntityId, label: impl Into<String>) -> StorageResult<()> {
        self.update(id, |e| {
            e.add_label(label);
        })
    }

    pub fn remove_label(&mut self, id: EntityId, label: &str) -> StorageResult<()> {
        self.update(id, |e| {
            e.remove_label(label);
        })
    }

    pub fn delete(&mut self, id: EntityId) -> StorageResult<()> {
        if self.get(id).is_none() {
            return Err(StorageError::NotFound(id));
        }
        trace!(entity = %id, "staging delete");
        self.staged.insert(id, None);
        Ok(())
    }

    fn update<F>(&mut self, id: EntityId, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Entity),
    {
        let mut entity = self.get(id).ok_or(StorageError::NotFound(id))?;
        f(&mut entity);
        self.staged.insert(id, Some(entity));
        Ok(())
    }

    /// What committing now would change, diffed against committed state.
    pub fn change_set(&self) -> ChangeSet {
        diff(&self.graph.read(), &self.staged)
    }

    /// Runs the hook and, if it accepts, applies every staged write at once.
    ///
    /// The store stays write-locked from diff to apply, so the hook sees
    /// exactly what will be committed.
    pub fn commit(self, hook: &dyn CommitHook) -> StorageResult<ChangeSet> {
        let mut entities = self.graph.write();
        let changes = diff(&entities, &self.staged);

        if let Err(rejection) = hook.before_commit(&changes) {
            debug!("transaction rolled back: {rejection}");
            return Err(rejection.into());
        }

        MemoryGraph::apply(&mut entities, &changes);
        drop(entities);

        hook.after_commit(&changes);
        Ok(changes)
    }

    /// Discards every staged write.
    pub fn rollback(self) {
        trace!(staged = self.staged.len(), "transaction discarded");
    }
}

fn diff(base: &BTreeMap<EntityId, Entity>, staged: &BTreeMap<EntityId, Option<Entity>>) -> ChangeSet {
    let mut changes = ChangeSet::new();
    for (id, entry) in staged {
        match (base.get(id), entry) {
            (None, Some(created)) => changes.created.push(created.clone()),
            (Some(previous), None) => changes.deleted.push(previous.clone()),
            (Some(previous), Some(current)) => {
                let change = Change::new(previous.clone(), current.clone());
                if !change.is_noop() {
                    changes.changed.push(change);
                }
            }
            (None, None) => {}
        }
    }
    changes
}
