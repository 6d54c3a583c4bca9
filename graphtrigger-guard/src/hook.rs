use crate::{CommitGuard, Rejection};
use graphtrigger_model::ChangeSet;

/// The contract between a storage engine and the trigger framework.
///
/// The engine calls `before_commit` right before making a transaction
/// durable. On `Err` it must abort the whole transaction and surface the
/// rejection to the client; nothing may be partially applied. On success it
/// applies the changes, then calls `after_commit` with the same change set.
pub trait CommitHook: Send + Sync {
    fn before_commit(&self, changes: &ChangeSet) -> Result<(), Rejection>;

    fn after_commit(&self, changes: &ChangeSet) {
        let _ = changes;
    }
}

impl CommitHook for CommitGuard {
    fn before_commit(&self, changes: &ChangeSet) -> Result<(), Rejection> {
        self.evaluate(changes)
    }
}
