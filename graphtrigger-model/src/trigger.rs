use crate::interest::{label_changed, property_changed};
use crate::{AllBusiness, Entity, InclusionPolicy, LockPolicy, ModelError, TriggerHandler};
use graphtrigger_types::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which subscriber lists a trigger joins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriptions {
    pub create: bool,
    pub delete: bool,
    pub modify: bool,
    /// "Any change": create, delete and modify, through `on_change`.
    pub change: bool,
}

impl Subscriptions {
    pub fn is_empty(&self) -> bool {
        !(self.create || self.delete || self.modify || self.change)
    }
}

/// An immutable trigger registration.
///
/// Built once through [`TriggerDefinition::builder`] and never edited; a new
/// configuration produces a new definition.
#[derive(Clone)]
pub struct TriggerDefinition {
    name: String,
    subscriptions: Subscriptions,
    when_properties_change: Vec<String>,
    when_labels_change: Vec<String>,
    inclusion: Arc<dyn InclusionPolicy>,
    handler: Arc<dyn TriggerHandler>,
    locks: LockPolicy,
}

impl TriggerDefinition {
    pub fn builder(name: impl Into<String>, handler: Arc<dyn TriggerHandler>) -> TriggerBuilder {
        TriggerBuilder {
            name: name.into(),
            subscriptions: Subscriptions::default(),
            when_properties_change: Vec::new(),
            when_labels_change: Vec::new(),
            inclusion: Arc::new(AllBusiness),
            handler,
            locks: LockPolicy::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscriptions(&self) -> Subscriptions {
        self.subscriptions
    }

    pub fn when_properties_change(&self) -> &[String] {
        &self.when_properties_change
    }

    pub fn when_labels_change(&self) -> &[String] {
        &self.when_labels_change
    }

    pub fn handler(&self) -> &dyn TriggerHandler {
        self.handler.as_ref()
    }

    pub fn locks(&self) -> &LockPolicy {
        &self.locks
    }

    pub fn inclusion(&self) -> &dyn InclusionPolicy {
        self.inclusion.as_ref()
    }

    /// Whether this trigger's own inclusion policy admits the entity.
    pub fn includes(&self, entity: &Entity) -> bool {
        self.inclusion.include(entity)
    }

    /// Whether a modification is relevant to this trigger.
    ///
    /// With no interest filters every modification is relevant. Otherwise the
    /// first listed property whose value differs, or listed label added or
    /// removed, makes it relevant; checking stops there.
    pub fn is_interested(&self, previous: &Entity, current: &Entity) -> bool {
        if self.when_properties_change.is_empty() && self.when_labels_change.is_empty() {
            return true;
        }

        self.when_properties_change
            .iter()
            .any(|name| property_changed(previous, current, name))
            || self
                .when_labels_change
                .iter()
                .any(|label| label_changed(previous, current, label))
    }
}

impl fmt::Debug for TriggerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerDefinition")
            .field("name", &self.name)
            .field("subscriptions", &self.subscriptions)
            .field("when_properties_change", &self.when_properties_change)
            .field("when_labels_change", &self.when_labels_change)
            .field("inclusion", &self.inclusion.describe())
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`TriggerDefinition`].
pub struct TriggerBuilder {
    name: String,
    subscriptions: Subscriptions,
    when_properties_change: Vec<String>,
    when_labels_change: Vec<String>,
    inclusion: Arc<dyn InclusionPolicy>,
    handler: Arc<dyn TriggerHandler>,
    locks: LockPolicy,
}

impl TriggerBuilder {
    #[must_use]
    pub fn on_create(mut self) -> Self {
        self.subscriptions.create = true;
        self
    }

    #[must_use]
    pub fn on_delete(mut self) -> Self {
        self.subscriptions.delete = true;
        self
    }

    #[must_use]
    pub fn on_modify(mut self) -> Self {
        self.subscriptions.modify = true;
        self
    }

    #[must_use]
    pub fn on_change(mut self) -> Self {
        self.subscriptions.change = true;
        self
    }

    #[must_use]
    pub fn subscriptions(mut self, subscriptions: Subscriptions) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    /// Restricts modify/change dispatch to changes of these properties.
    /// Duplicates are dropped; declaration order is kept.
    #[must_use]
    pub fn when_properties_change<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.when_properties_change, names);
        self
    }

    /// Restricts modify/change dispatch to additions/removals of these labels.
    #[must_use]
    pub fn when_labels_change<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extend_unique(&mut self.when_labels_change, labels);
        self
    }

    #[must_use]
    pub fn inclusion(mut self, policy: Arc<dyn InclusionPolicy>) -> Self {
        self.inclusion = policy;
        self
    }

    /// Locks this trigger contributes to the registry-wide lock policy.
    #[must_use]
    pub fn locks(mut self, locks: LockPolicy) -> Self {
        self.locks = locks;
        self
    }

    #[must_use]
    pub fn lock_property(mut self, event: EventKind, name: impl Into<String>) -> Self {
        self.locks = self.locks.lock_property(event, name);
        self
    }

    #[must_use]
    pub fn lock_label(mut self, event: EventKind, label: impl Into<String>) -> Self {
        self.locks = self.locks.lock_label(event, label);
        self
    }

    pub fn build(self) -> Result<TriggerDefinition, ModelError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ModelError::EmptyTriggerName);
        }

        Ok(TriggerDefinition {
            name,
            subscriptions: self.subscriptions,
            when_properties_change: self.when_properties_change,
            when_labels_change: self.when_labels_change,
            inclusion: self.inclusion,
            handler: self.handler,
            locks: self.locks,
        })
    }
}

fn extend_unique<I, S>(target: &mut Vec<String>, names: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for name in names {
        let name = name.into();
        if !target.contains(&name) {
            target.push(name);
        }
    }
}
