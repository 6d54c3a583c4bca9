//! Trigger module configuration.
//!
//! Settings come from a string map handed over by the host at bootstrap, or
//! from the `[module]` table of a TOML file. Anything missing keeps its
//! default.

use crate::{GuardError, GuardResult};
use graphtrigger_model::InclusionSelector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Map key for the initial scan batch size.
pub const KEY_SCAN_BATCH_SIZE: &str = "scan_batch_size";
/// Map key for the trigger manifest directory.
pub const KEY_TRIGGERS: &str = "triggers";
/// Map key for the label that marks trigger nodes.
pub const KEY_TRIGGER_LABEL: &str = "DATABASE_TRIGGER";
/// Map key for the trigger node index name.
pub const KEY_TRIGGER_INDEX: &str = "triggerNodeIndex";
/// Map key for the SQLite file backing the trigger node index.
pub const KEY_TRIGGER_INDEX_PATH: &str = "trigger_index_path";
/// Map key for the module-wide inclusion selector.
pub const KEY_NODE_INCLUSION: &str = "node";
/// Map key for label lock enforcement.
pub const KEY_ENFORCE_LABEL_LOCKS: &str = "enforce_label_locks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerModuleConfig {
    pub module_id: String,
    pub scan_batch_size: usize,
    pub triggers_directory: PathBuf,
    pub trigger_node_label: String,
    pub trigger_index_name: String,
    /// SQLite file for the trigger node index. Unset keeps the index in
    /// memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_index_path: Option<PathBuf>,
    pub node_inclusion: InclusionSelector,
    pub enforce_label_locks: bool,
}

impl Default for TriggerModuleConfig {
    fn default() -> Self {
        Self {
            module_id: "TRGM".to_string(),
            scan_batch_size: 1000,
            triggers_directory: PathBuf::from("triggers"),
            trigger_node_label: "DATABASE_TRIGGER".to_string(),
            trigger_index_name: "triggerNodeIndex".to_string(),
            trigger_index_path: None,
            node_inclusion: InclusionSelector::Business,
            enforce_label_locks: true,
        }
    }
}

/// Raw TOML structure of a config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    module: TriggerModuleConfig,
}

impl TriggerModuleConfig {
    /// Builds a config from bootstrap key/value pairs.
    ///
    /// Empty values keep the default. Unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> GuardResult<Self> {
        let mut config = Self::default();
        let value = |key: &str| map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(raw) = value(KEY_SCAN_BATCH_SIZE) {
            let size = raw.parse::<usize>().map_err(|e| {
                GuardError::Config(format!("{KEY_SCAN_BATCH_SIZE} '{raw}' is not a number: {e}"))
            })?;
            info!(batch_size = size, "scan batch size overridden");
            config.scan_batch_size = size;
        }

        if let Some(dir) = value(KEY_TRIGGERS) {
            info!("triggers directory set to {dir}");
            config.triggers_directory = PathBuf::from(dir);
        }

        if let Some(label) = value(KEY_TRIGGER_LABEL) {
            info!("trigger node label set to {label}");
            config.trigger_node_label = label.to_string();
        }

        if let Some(index) = value(KEY_TRIGGER_INDEX) {
            info!("trigger node index set to {index}");
            config.trigger_index_name = index.to_string();
        }

        if let Some(path) = value(KEY_TRIGGER_INDEX_PATH) {
            info!("trigger node index stored in {path}");
            config.trigger_index_path = Some(PathBuf::from(path));
        }

        if let Some(selector) = value(KEY_NODE_INCLUSION) {
            config.node_inclusion = selector.parse()?;
            info!("node inclusion policy set to {}", config.node_inclusion);
        }

        if let Some(raw) = value(KEY_ENFORCE_LABEL_LOCKS) {
            config.enforce_label_locks = raw.parse::<bool>().map_err(|e| {
                GuardError::Config(format!("{KEY_ENFORCE_LABEL_LOCKS} '{raw}' is not a bool: {e}"))
            })?;
            info!(enabled = config.enforce_label_locks, "label lock enforcement set");
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads the `[module]` table of a TOML file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load_from(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No trigger config found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&contents)
            .map_err(|e| GuardError::Config(format!("failed to parse {}: {e}", path.display())))?;
        file.module.validate()?;
        info!("Loaded trigger config from {:?}", path);
        Ok(file.module)
    }

    fn validate(&self) -> GuardResult<()> {
        if self.scan_batch_size == 0 {
            return Err(GuardError::Config(format!(
                "{KEY_SCAN_BATCH_SIZE} must be greater than zero"
            )));
        }
        if self.module_id.trim().is_empty() {
            return Err(GuardError::Config("module_id must not be empty".to_string()));
        }
        if self.trigger_index_name.trim().is_empty() {
            return Err(GuardError::Config("trigger_index_name must not be empty".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_scan_batch_size(mut self, size: usize) -> Self {
        self.scan_batch_size = size;
        self
    }

    #[must_use]
    pub fn with_triggers_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.triggers_directory = dir.into();
        self
    }

    #[must_use]
    pub fn with_trigger_node_label(mut self, label: impl Into<String>) -> Self {
        self.trigger_node_label = label.into();
        self
    }

    #[must_use]
    pub fn with_trigger_index_name(mut self, name: impl Into<String>) -> Self {
        self.trigger_index_name = name.into();
        self
    }

    #[must_use]
    pub fn with_trigger_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trigger_index_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_node_inclusion(mut self, selector: InclusionSelector) -> Self {
        self.node_inclusion = selector;
        self
    }

    #[must_use]
    pub fn with_label_lock_enforcement(mut self, enabled: bool) -> Self {
        self.enforce_label_locks = enabled;
        self
    }
}
