use crate::{IndexError, IndexResult, TriggerIndex};
use graphtrigger_types::EntityId;
use std::sync::Arc;

/// Read-side view over a shared [`TriggerIndex`].
#[derive(Clone)]
pub struct TriggerIndexReader {
    index: Arc<dyn TriggerIndex>,
}

impl TriggerIndexReader {
    pub fn new(index: Arc<dyn TriggerIndex>) -> Self {
        Self { index }
    }

    /// Ids registered under `label`.
    ///
    /// Returns [`IndexError::NotFound`] if the label holds nothing.
    pub fn trigger_entities(&self, label: &str) -> IndexResult<Vec<EntityId>> {
        let ids = self.index.get_all(label)?;
        if ids.is_empty() {
            return Err(IndexError::NotFound {
                label: label.to_string(),
            });
        }
        Ok(ids)
    }

    /// Like [`trigger_entities`](Self::trigger_entities) but an empty label
    /// yields an empty list.
    pub fn try_trigger_entities(&self, label: &str) -> IndexResult<Vec<EntityId>> {
        self.index.get_all(label)
    }

    pub fn contains(&self, label: &str, id: EntityId) -> IndexResult<bool> {
        Ok(self.index.get_all(label)?.contains(&id))
    }
}
