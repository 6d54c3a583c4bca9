//! Legacy trigger-node index for graphtrigger.
//!
//! Older deployments stored trigger definitions as graph nodes carrying a
//! dedicated label, and located them through a named index. This crate keeps
//! that side-channel alive:
//! - [`TriggerIndex`]: the put/remove/get_all contract
//! - [`MemoryTriggerIndex`] and [`SqliteTriggerIndex`]: the two backends
//! - [`TriggerIndexReader`]: read-side lookups that fail on empty labels
//! - [`TriggerIndexer`]: keeps an index in step with committed change sets

mod error;
mod indexer;
mod memory;
mod reader;
mod sqlite;

pub use error::{IndexError, IndexResult};
pub use indexer::TriggerIndexer;
pub use memory::MemoryTriggerIndex;
pub use reader::TriggerIndexReader;
pub use sqlite::SqliteTriggerIndex;

use graphtrigger_types::EntityId;

/// Label-keyed set of entity ids.
///
/// Absence is never an error here: `get_all` on an unknown label returns an
/// empty list. Ids come back sorted.
pub trait TriggerIndex: Send + Sync {
    /// Adds `id` under `label`. Adding twice is a no-op.
    fn put(&self, label: &str, id: EntityId) -> IndexResult<()>;

    /// Removes `id` from `label`. Removing a missing id is a no-op.
    fn remove(&self, label: &str, id: EntityId) -> IndexResult<()>;

    fn get_all(&self, label: &str) -> IndexResult<Vec<EntityId>>;

    /// Labels that currently hold at least one id, sorted.
    fn labels(&self) -> IndexResult<Vec<String>>;
}
