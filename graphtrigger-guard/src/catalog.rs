use crate::builtin::{Allow, ForbidLabels, Reject, RequireProperties};
use crate::manifest::{load_manifests, ManifestEvent, TriggerSpec};
use crate::{GuardError, GuardResult};
use graphtrigger_model::{TriggerDefinition, TriggerHandler};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Builds a handler from a manifest's `params` table.
pub type HandlerFactory =
    Arc<dyn Fn(&toml::Table) -> GuardResult<Arc<dyn TriggerHandler>> + Send + Sync>;

/// Maps handler names used in manifests to factories.
#[derive(Clone, Default)]
pub struct TriggerCatalog {
    factories: BTreeMap<String, HandlerFactory>,
}

impl TriggerCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding `allow`, `reject`, `require-properties` and
    /// `forbid-labels`.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register("allow", |_| Ok(Arc::new(Allow)));
        catalog.register("reject", |params| Ok(Arc::new(Reject::from_params(params)?)));
        catalog.register("require-properties", |params| {
            Ok(Arc::new(RequireProperties::from_params(params)?))
        });
        catalog.register("forbid-labels", |params| {
            Ok(Arc::new(ForbidLabels::from_params(params)?))
        });
        catalog
    }

    /// Registers (or replaces) a factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&toml::Table) -> GuardResult<Arc<dyn TriggerHandler>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered handler names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Turns one manifest entry into a trigger definition.
    pub fn build_definition(&self, spec: &TriggerSpec) -> GuardResult<TriggerDefinition> {
        let factory = self
            .factories
            .get(&spec.handler)
            .ok_or_else(|| GuardError::UnknownHandler {
                trigger: spec.name.clone(),
                handler: spec.handler.clone(),
            })?;
        let handler = factory(&spec.params)?;

        let mut builder = TriggerDefinition::builder(spec.name.as_str(), handler)
            .when_properties_change(spec.when_properties_change.iter().cloned())
            .when_labels_change(spec.when_labels_change.iter().cloned())
            .locks(spec.locks.to_policy());

        for event in &spec.events {
            builder = match event {
                ManifestEvent::Create => builder.on_create(),
                ManifestEvent::Delete => builder.on_delete(),
                ManifestEvent::Modify => builder.on_modify(),
                ManifestEvent::Change => builder.on_change(),
            };
        }

        if let Some(selector) = &spec.inclusion {
            builder = builder.inclusion(Arc::new(selector.clone()));
        }

        Ok(builder.build()?)
    }

    /// Loads and builds every trigger declared in `dir`, in file-name then
    /// declaration order.
    pub fn load_directory(&self, dir: &Path) -> GuardResult<Vec<TriggerDefinition>> {
        let specs = load_manifests(dir)?;
        let definitions = specs
            .iter()
            .map(|(_, spec)| self.build_definition(spec))
            .collect::<GuardResult<Vec<_>>>()?;
        info!(
            dir = %dir.display(),
            triggers = definitions.len(),
            "loaded trigger manifests"
        );
        Ok(definitions)
    }
}

impl fmt::Debug for TriggerCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerCatalog")
            .field("handlers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
