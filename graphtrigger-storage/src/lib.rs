//! Reference graph storage for graphtrigger.
//!
//! [`MemoryGraph`] is a small ordered entity store whose transactions go
//! through a [`CommitHook`](graphtrigger_guard::CommitHook) before they become
//! visible. It exists to exercise the guard end to end and to back the
//! command-line tool; production engines implement the same contract.

mod error;
mod graph;
mod transaction;

pub use error::{StorageError, StorageResult};
pub use graph::MemoryGraph;
pub use transaction::GraphTransaction;
