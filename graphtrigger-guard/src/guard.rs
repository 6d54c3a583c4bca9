use crate::{Rejection, TriggerRegistry};
use graphtrigger_model::{
    AllBusiness, Change, ChangeSet, Entity, HandlerResult, InclusionPolicy, TriggerDefinition,
};
use graphtrigger_types::{EntityId, EventKind};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

/// Decides whether a pending transaction may commit.
///
/// The guard owns a snapshot pointer to the current [`TriggerRegistry`].
/// Each evaluation clones that pointer and runs without holding any lock, so
/// a concurrent [`replace_registry`](Self::replace_registry) only affects
/// later commits.
pub struct CommitGuard {
    registry: RwLock<Arc<TriggerRegistry>>,
    inclusion: Arc<dyn InclusionPolicy>,
}

impl CommitGuard {
    /// Creates a guard that only looks at business (non-internal) entities.
    pub fn new(registry: TriggerRegistry) -> Self {
        Self::with_inclusion(registry, Arc::new(AllBusiness))
    }

    /// Creates a guard with a custom module-wide inclusion policy.
    pub fn with_inclusion(registry: TriggerRegistry, inclusion: Arc<dyn InclusionPolicy>) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            inclusion,
        }
    }

    /// Current registry snapshot.
    pub fn registry(&self) -> Arc<TriggerRegistry> {
        let guard = self.registry.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swaps in a new registry and returns the previous one.
    pub fn replace_registry(&self, registry: TriggerRegistry) -> Arc<TriggerRegistry> {
        let mut guard = self.registry.write().unwrap_or_else(|e| e.into_inner());
        debug!(triggers = registry.len(), "replacing trigger registry");
        std::mem::replace(&mut *guard, Arc::new(registry))
    }

    pub fn inclusion(&self) -> &dyn InclusionPolicy {
        self.inclusion.as_ref()
    }

    /// Runs every lock check and trigger callback for one change set.
    ///
    /// Creates are processed first, then deletes, then modifications, each in
    /// the order the change set lists them. Within an entity, lock checks run
    /// before the dedicated subscribers, which run before the `on_change`
    /// subscribers. Processing stops at the first violation or veto.
    pub fn evaluate(&self, changes: &ChangeSet) -> Result<(), Rejection> {
        let registry = self.registry();

        if let Some(entity) = changes.duplicate_identity() {
            debug!(%entity, "rejecting malformed change set");
            return Err(Rejection::InvalidChangeSet { entity });
        }
        if let Some(change) = changes.mismatched_change() {
            debug!(previous = %change.previous.id, current = %change.current.id, "rejecting malformed change set");
            return Err(Rejection::MismatchedChange {
                previous: change.previous.id,
                current: change.current.id,
            });
        }

        trace!(
            created = changes.created.len(),
            deleted = changes.deleted.len(),
            changed = changes.changed.len(),
            "evaluating commit"
        );

        let outcome = self
            .evaluate_created(&registry, &changes.created)
            .and_then(|()| self.evaluate_deleted(&registry, &changes.deleted))
            .and_then(|()| self.evaluate_changed(&registry, &changes.changed));

        if let Err(rejection) = &outcome {
            debug!(entity = %rejection.entity(), "commit rejected: {rejection}");
        }
        outcome
    }

    fn evaluate_created(&self, registry: &TriggerRegistry, created: &[Entity]) -> Result<(), Rejection> {
        for entity in created {
            if !self.inclusion.include(entity) {
                trace!(entity = %entity.id, "created entity excluded");
                continue;
            }

            if let Some(violation) = registry.locks().check_created(entity) {
                return Err(violation.into());
            }

            for trigger in registry.on_create().iter().filter(|t| t.includes(entity)) {
                invoke(trigger, EventKind::Create, entity.id, || {
                    trigger.handler().on_create(entity)
                })?;
            }

            for trigger in registry.on_change().iter().filter(|t| t.includes(entity)) {
                invoke(trigger, EventKind::Create, entity.id, || {
                    trigger.handler().on_change(EventKind::Create, None, Some(entity))
                })?;
            }
        }
        Ok(())
    }

    fn evaluate_deleted(&self, registry: &TriggerRegistry, deleted: &[Entity]) -> Result<(), Rejection> {
        for entity in deleted {
            if !self.inclusion.include(entity) {
                trace!(entity = %entity.id, "deleted entity excluded");
                continue;
            }

            if let Some(violation) = registry.locks().check_deleted(entity) {
                return Err(violation.into());
            }

            for trigger in registry.on_delete().iter().filter(|t| t.includes(entity)) {
                invoke(trigger, EventKind::Delete, entity.id, || {
                    trigger.handler().on_delete(entity)
                })?;
            }

            for trigger in registry.on_change().iter().filter(|t| t.includes(entity)) {
                invoke(trigger, EventKind::Delete, entity.id, || {
                    trigger.handler().on_change(EventKind::Delete, Some(entity), None)
                })?;
            }
        }
        Ok(())
    }

    fn evaluate_changed(&self, registry: &TriggerRegistry, changed: &[Change]) -> Result<(), Rejection> {
        for change in changed {
            let (previous, current) = (&change.previous, &change.current);

            // A relabel can move an entity in or out of scope; either side counts.
            if !self.inclusion.include(current) && !self.inclusion.include(previous) {
                trace!(entity = %change.id(), "changed entity excluded");
                continue;
            }

            if let Some(violation) = registry.locks().check_modified(previous, current) {
                return Err(violation.into());
            }

            let relevant = |t: &&Arc<TriggerDefinition>| {
                (t.includes(current) || t.includes(previous)) && t.is_interested(previous, current)
            };

            for trigger in registry.on_modify().iter().filter(relevant) {
                invoke(trigger, EventKind::Modify, change.id(), || {
                    trigger.handler().on_modify(previous, current)
                })?;
            }

            for trigger in registry.on_change().iter().filter(relevant) {
                invoke(trigger, EventKind::Modify, change.id(), || {
                    trigger
                        .handler()
                        .on_change(EventKind::Modify, Some(previous), Some(current))
                })?;
            }
        }
        Ok(())
    }
}

/// Calls one handler callback, turning a veto or a panic into a rejection.
fn invoke<F>(trigger: &TriggerDefinition, event: EventKind, entity: EntityId, call: F) -> Result<(), Rejection>
where
    F: FnOnce() -> HandlerResult,
{
    trace!(trigger = trigger.name(), %event, %entity, "invoking trigger");

    run_handler(call).map_err(|reason| Rejection::TriggerVeto {
        trigger: trigger.name().to_string(),
        event,
        entity,
        reason,
    })
}

/// Runs a handler callback. A panic becomes a veto whose reason carries the
/// panic message.
pub(crate) fn run_handler<F>(call: F) -> HandlerResult
where
    F: FnOnce() -> HandlerResult,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(format!("handler panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_from_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn run_handler_keeps_veto_and_panic_reasons() {
        assert_eq!(run_handler(|| Ok(())), Ok(()));
        assert_eq!(run_handler(|| Err("nope".to_string())), Err("nope".to_string()));
        assert_eq!(
            run_handler(|| panic!("disk on fire")),
            Err("handler panicked: disk on fire".to_string())
        );
    }
}
