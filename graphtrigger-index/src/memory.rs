use crate::{IndexError, IndexResult, TriggerIndex};
use graphtrigger_types::EntityId;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

/// In-process index. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryTriggerIndex {
    entries: RwLock<BTreeMap<String, BTreeSet<EntityId>>>,
}

impl MemoryTriggerIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> IndexError {
    IndexError::Storage("memory index lock poisoned".to_string())
}

impl TriggerIndex for MemoryTriggerIndex {
    fn put(&self, label: &str, id: EntityId) -> IndexResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.entry(label.to_string()).or_default().insert(id);
        Ok(())
    }

    fn remove(&self, label: &str, id: EntityId) -> IndexResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if let Some(ids) = entries.get_mut(label) {
            ids.remove(&id);
            if ids.is_empty() {
                entries.remove(label);
            }
        }
        Ok(())
    }

    fn get_all(&self, label: &str) -> IndexResult<Vec<EntityId>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .get(label)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    fn labels(&self) -> IndexResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}
