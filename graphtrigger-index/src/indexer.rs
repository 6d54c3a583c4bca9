use crate::{IndexResult, TriggerIndex, TriggerIndexReader};
use graphtrigger_model::{ChangeSet, Entity};
use std::sync::Arc;
use tracing::{debug, trace};

/// Mirrors entities carrying the trigger-node label into a [`TriggerIndex`].
///
/// Only committed change sets should be fed in; the indexer never looks at
/// rejected transactions.
#[derive(Clone)]
pub struct TriggerIndexer {
    index: Arc<dyn TriggerIndex>,
    label: String,
}

impl TriggerIndexer {
    pub fn new(index: Arc<dyn TriggerIndex>, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reader(&self) -> TriggerIndexReader {
        TriggerIndexReader::new(Arc::clone(&self.index))
    }

    /// Indexes a pre-existing entity if it carries the label.
    /// Returns whether the entity was indexed.
    pub fn index_existing(&self, entity: &Entity) -> IndexResult<bool> {
        if entity.has_label(&self.label) {
            self.index.put(&self.label, entity.id)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Applies one committed change set. Returns the number of index writes.
    pub fn apply(&self, changes: &ChangeSet) -> IndexResult<usize> {
        let mut writes = 0;

        for entity in changes.created.iter().filter(|e| e.has_label(&self.label)) {
            self.index.put(&self.label, entity.id)?;
            writes += 1;
        }

        for entity in changes.deleted.iter().filter(|e| e.has_label(&self.label)) {
            self.index.remove(&self.label, entity.id)?;
            writes += 1;
        }

        for change in &changes.changed {
            let before = change.previous.has_label(&self.label);
            let after = change.current.has_label(&self.label);
            match (before, after) {
                (false, true) => self.index.put(&self.label, change.id())?,
                (true, false) => self.index.remove(&self.label, change.id())?,
                _ => continue,
            }
            trace!(entity = %change.id(), added = after, "trigger label toggled");
            writes += 1;
        }

        if writes > 0 {
            debug!(label = %self.label, writes, "trigger index updated");
        }
        Ok(writes)
    }
}
