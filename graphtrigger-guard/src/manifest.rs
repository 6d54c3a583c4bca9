//! Trigger manifests: TOML files declaring triggers by handler name.
//!
//! ```toml
//! [[trigger]]
//! name = "uuid"
//! handler = "require-properties"
//! events = ["create", "modify"]
//! when_properties_change = ["uuid"]
//! inclusion = "label:Person"
//!
//! [trigger.params]
//! properties = ["uuid"]
//!
//! [trigger.locks.modify]
//! properties = ["uuid"]
//! ```

use crate::{GuardError, GuardResult};
use graphtrigger_model::{InclusionSelector, LockPolicy};
use graphtrigger_types::EventKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Callback lists a manifest trigger can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestEvent {
    Create,
    Delete,
    Modify,
    Change,
}

/// One parsed manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerManifest {
    #[serde(default, rename = "trigger")]
    pub triggers: Vec<TriggerSpec>,
}

/// A `[[trigger]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerSpec {
    pub name: String,
    /// Catalog name of the handler factory.
    pub handler: String,
    #[serde(default)]
    pub events: Vec<ManifestEvent>,
    #[serde(default)]
    pub when_properties_change: Vec<String>,
    #[serde(default)]
    pub when_labels_change: Vec<String>,
    /// Defaults to the business selector when absent.
    #[serde(default)]
    pub inclusion: Option<InclusionSelector>,
    /// Passed verbatim to the handler factory.
    #[serde(default)]
    pub params: toml::Table,
    #[serde(default)]
    pub locks: ManifestLocks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestLocks {
    #[serde(default)]
    pub create: ManifestLockSet,
    #[serde(default)]
    pub modify: ManifestLockSet,
    #[serde(default)]
    pub delete: ManifestLockSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestLockSet {
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ManifestLocks {
    pub fn to_policy(&self) -> LockPolicy {
        let sets = [
            (EventKind::Create, &self.create),
            (EventKind::Modify, &self.modify),
            (EventKind::Delete, &self.delete),
        ];
        sets.into_iter().fold(LockPolicy::new(), |policy, (event, set)| {
            let policy = set
                .properties
                .iter()
                .fold(policy, |p, name| p.lock_property(event, name.as_str()));
            set.labels
                .iter()
                .fold(policy, |p, label| p.lock_label(event, label.as_str()))
        })
    }
}

impl TriggerManifest {
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &Path) -> GuardResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|e| GuardError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Reads every `*.toml` manifest in `dir`, in file-name order.
///
/// Returns each trigger spec with the file it came from.
pub fn load_manifests(dir: &Path) -> GuardResult<Vec<(PathBuf, TriggerSpec)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();

    let mut specs = Vec::new();
    for path in files {
        let manifest = TriggerManifest::load(&path)?;
        debug!(path = %path.display(), triggers = manifest.triggers.len(), "loaded trigger manifest");
        specs.extend(manifest.triggers.into_iter().map(|spec| (path.clone(), spec)));
    }
    Ok(specs)
}
