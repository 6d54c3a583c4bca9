use crate::Entity;
use graphtrigger_types::EventKind;

/// Outcome of a handler call. `Err(reason)` vetoes the enclosing commit.
pub type HandlerResult = Result<(), String>;

/// The behaviour half of a trigger.
///
/// Every callback defaults to allowing the change, so a trigger only
/// implements the events it cares about. The guard calls a callback only if
/// the owning [`TriggerDefinition`](crate::TriggerDefinition) subscribes to
/// that event and, for modifications, its interest filters matched.
///
/// Handlers run on the committing thread while the transaction is pending.
/// They must be quick decision functions: no new transactions, no writes to
/// unrelated entities. Returning `Err` is the only way to stop a commit. A
/// panic is caught by the guard and treated the same as `Err`.
pub trait TriggerHandler: Send + Sync {
    /// Called once per created entity.
    fn on_create(&self, entity: &Entity) -> HandlerResult {
        let _ = entity;
        Ok(())
    }

    /// Called once per deleted entity, with its pre-delete snapshot.
    fn on_delete(&self, entity: &Entity) -> HandlerResult {
        let _ = entity;
        Ok(())
    }

    /// Called once per modified entity the trigger is interested in.
    fn on_modify(&self, previous: &Entity, current: &Entity) -> HandlerResult {
        let _ = (previous, current);
        Ok(())
    }

    /// Called for every create, delete and (interesting) modify.
    ///
    /// `previous` is `None` for creates, `current` is `None` for deletes.
    fn on_change(
        &self,
        event: EventKind,
        previous: Option<&Entity>,
        current: Option<&Entity>,
    ) -> HandlerResult {
        let _ = (event, previous, current);
        Ok(())
    }
}
