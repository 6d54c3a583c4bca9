use crate::{GuardError, GuardResult};
use graphtrigger_model::{LockPolicy, TriggerDefinition};
use graphtrigger_types::EventKind;
use std::sync::Arc;
use tracing::debug;

/// Immutable set of registered triggers.
///
/// Holds one subscriber list per callback in registration order, plus the
/// lock policy merged from the module's explicit locks and every trigger's
/// own declarations. Reconfiguring means building a new registry.
#[derive(Debug, Clone)]
pub struct TriggerRegistry {
    triggers: Vec<Arc<TriggerDefinition>>,
    create: Vec<Arc<TriggerDefinition>>,
    delete: Vec<Arc<TriggerDefinition>>,
    modify: Vec<Arc<TriggerDefinition>>,
    change: Vec<Arc<TriggerDefinition>>,
    locks: LockPolicy,
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self {
            triggers: Vec::new(),
            create: Vec::new(),
            delete: Vec::new(),
            modify: Vec::new(),
            change: Vec::new(),
            locks: LockPolicy::default(),
        }
    }
}

impl TriggerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry with no triggers and no locks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All triggers, in registration order.
    pub fn triggers(&self) -> &[Arc<TriggerDefinition>] {
        &self.triggers
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TriggerDefinition>> {
        self.triggers.iter().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn on_create(&self) -> &[Arc<TriggerDefinition>] {
        &self.create
    }

    pub fn on_delete(&self) -> &[Arc<TriggerDefinition>] {
        &self.delete
    }

    pub fn on_modify(&self) -> &[Arc<TriggerDefinition>] {
        &self.modify
    }

    /// "Any change" subscribers.
    pub fn on_change(&self) -> &[Arc<TriggerDefinition>] {
        &self.change
    }

    /// Dedicated subscribers for one event kind (not including `on_change`).
    pub fn subscribers(&self, event: EventKind) -> &[Arc<TriggerDefinition>] {
        match event {
            EventKind::Create => &self.create,
            EventKind::Modify => &self.modify,
            EventKind::Delete => &self.delete,
        }
    }

    pub fn locks(&self) -> &LockPolicy {
        &self.locks
    }
}

/// Collects definitions and locks, then freezes them into a
/// [`TriggerRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<TriggerDefinition>,
    locks: LockPolicy,
}

impl RegistryBuilder {
    #[must_use]
    pub fn register(mut self, definition: TriggerDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    #[must_use]
    pub fn register_all(mut self, definitions: impl IntoIterator<Item = TriggerDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Module-level locks not tied to any trigger. They are merged first,
    /// so they keep their attribution over identical trigger declarations.
    #[must_use]
    pub fn locks(mut self, locks: LockPolicy) -> Self {
        self.locks = locks;
        self
    }

    #[must_use]
    pub fn label_enforcement(mut self, enabled: bool) -> Self {
        self.locks = self.locks.with_label_enforcement(enabled);
        self
    }

    pub fn build(self) -> GuardResult<TriggerRegistry> {
        let mut registry = TriggerRegistry {
            locks: self.locks,
            ..TriggerRegistry::default()
        };

        for definition in self.definitions {
            if registry.get(definition.name()).is_some() {
                return Err(GuardError::DuplicateTrigger(definition.name().to_string()));
            }

            registry
                .locks
                .merge(definition.locks(), Some(definition.name()));

            let definition = Arc::new(definition);
            let subs = definition.subscriptions();
            if subs.create {
                registry.create.push(Arc::clone(&definition));
            }
            if subs.delete {
                registry.delete.push(Arc::clone(&definition));
            }
            if subs.modify {
                registry.modify.push(Arc::clone(&definition));
            }
            if subs.change {
                registry.change.push(Arc::clone(&definition));
            }
            registry.triggers.push(definition);
        }

        debug!(
            triggers = registry.triggers.len(),
            create = registry.create.len(),
            delete = registry.delete.len(),
            modify = registry.modify.len(),
            change = registry.change.len(),
            "trigger registry built"
        );
        Ok(registry)
    }
}
