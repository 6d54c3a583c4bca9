use crate::{
    CommitGuard, CommitHook, EntitySource, GuardResult, InitialScanner, Rejection, ScanError,
    ScanReport, TriggerCatalog, TriggerModuleConfig, TriggerRegistry,
};
use graphtrigger_index::{MemoryTriggerIndex, SqliteTriggerIndex, TriggerIndex, TriggerIndexer};
use graphtrigger_model::{ChangeSet, InclusionPolicy};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// The runtime object a storage engine hooks into.
///
/// Owns the guard, the module-wide inclusion policy and, optionally, an
/// indexer that mirrors trigger nodes into the legacy index after each
/// successful commit.
pub struct TriggerModule {
    config: TriggerModuleConfig,
    guard: CommitGuard,
    inclusion: Arc<dyn InclusionPolicy>,
    indexer: Option<TriggerIndexer>,
}

impl fmt::Debug for TriggerModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerModule")
            .field("config", &self.config)
            .field("has_indexer", &self.indexer.is_some())
            .finish_non_exhaustive()
    }
}

impl TriggerModule {
    /// Creates a module from an already built registry. No indexer is
    /// attached.
    pub fn new(config: TriggerModuleConfig, registry: TriggerRegistry) -> Self {
        let inclusion: Arc<dyn InclusionPolicy> = Arc::new(config.node_inclusion.clone());
        Self {
            guard: CommitGuard::with_inclusion(registry, Arc::clone(&inclusion)),
            inclusion,
            indexer: None,
            config,
        }
    }

    #[must_use]
    pub fn with_indexer(mut self, indexer: TriggerIndexer) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// Builds the module from host-provided key/value settings.
    ///
    /// Triggers are loaded from the configured directory if it exists, and
    /// the configured trigger index is attached.
    pub fn bootstrap(settings: &HashMap<String, String>, catalog: &TriggerCatalog) -> GuardResult<Self> {
        let config = TriggerModuleConfig::from_map(settings)?;
        let indexer = Self::open_indexer(&config)?;
        Ok(Self::from_config(config, catalog)?.with_indexer(indexer))
    }

    /// Opens the trigger index `config` describes: the SQLite file at
    /// `trigger_index_path` scoped to `trigger_index_name`, or a fresh
    /// in-memory index when no path is set.
    pub fn open_indexer(config: &TriggerModuleConfig) -> GuardResult<TriggerIndexer> {
        let index: Arc<dyn TriggerIndex> = match &config.trigger_index_path {
            Some(path) => {
                info!(
                    path = %path.display(),
                    index = %config.trigger_index_name,
                    "opening trigger node index"
                );
                Arc::new(SqliteTriggerIndex::open(path, config.trigger_index_name.as_str())?)
            }
            None => Arc::new(MemoryTriggerIndex::new()),
        };
        Ok(TriggerIndexer::new(index, config.trigger_node_label.clone()))
    }

    /// Builds the module from a config value, loading manifests from its
    /// triggers directory when present.
    pub fn from_config(config: TriggerModuleConfig, catalog: &TriggerCatalog) -> GuardResult<Self> {
        let registry = Self::load_registry(&config, catalog)?;
        info!(
            module = %config.module_id,
            triggers = registry.len(),
            inclusion = %config.node_inclusion,
            "trigger module configured"
        );
        Ok(Self::new(config, registry))
    }

    /// Re-reads the triggers directory and swaps the registry in one step.
    /// On error the current registry stays active.
    pub fn reload(&self, catalog: &TriggerCatalog) -> GuardResult<()> {
        let registry = Self::load_registry(&self.config, catalog)?;
        info!(triggers = registry.len(), "trigger registry reloaded");
        self.guard.replace_registry(registry);
        Ok(())
    }

    fn load_registry(config: &TriggerModuleConfig, catalog: &TriggerCatalog) -> GuardResult<TriggerRegistry> {
        let dir = &config.triggers_directory;
        let definitions = if dir.is_dir() {
            catalog.load_directory(dir)?
        } else {
            info!("No triggers directory at {:?}, starting without triggers", dir);
            Vec::new()
        };

        TriggerRegistry::builder()
            .label_enforcement(config.enforce_label_locks)
            .register_all(definitions)
            .build()
    }

    /// Offers every pre-existing entity to create triggers, and indexes
    /// existing trigger nodes when an indexer is attached.
    pub fn initialize(&self, source: &dyn EntitySource) -> Result<ScanReport, ScanError> {
        let scanner = InitialScanner::new(
            self.guard.registry(),
            Arc::clone(&self.inclusion),
            self.config.scan_batch_size,
        );

        match &self.indexer {
            Some(indexer) => scanner.scan_with(source, |entity| {
                indexer
                    .index_existing(entity)
                    .map(|_| ())
                    .map_err(|e| ScanError::Visitor {
                        entity: entity.id,
                        reason: e.to_string(),
                    })
            }),
            None => scanner.scan(source),
        }
    }

    pub fn config(&self) -> &TriggerModuleConfig {
        &self.config
    }

    pub fn guard(&self) -> &CommitGuard {
        &self.guard
    }

    pub fn registry(&self) -> Arc<TriggerRegistry> {
        self.guard.registry()
    }

    pub fn indexer(&self) -> Option<&TriggerIndexer> {
        self.indexer.as_ref()
    }
}

impl CommitHook for TriggerModule {
    fn before_commit(&self, changes: &ChangeSet) -> Result<(), Rejection> {
        self.guard.evaluate(changes)
    }

    fn after_commit(&self, changes: &ChangeSet) {
        let Some(indexer) = &self.indexer else {
            return;
        };
        // The transaction is already durable; an index failure cannot undo it.
        if let Err(e) = indexer.apply(changes) {
            warn!("failed to update trigger index after commit: {e}");
        }
    }
}
