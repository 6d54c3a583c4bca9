//! Library half of the `graphtrigger` binary: loading a module from disk,
//! reading change sets and entity dumps, and rendering results.

use anyhow::{Context, Result};
use graphtrigger_guard::{
    CommitHook, Rejection, ScanReport, TriggerCatalog, TriggerModule, TriggerModuleConfig,
    TriggerRegistry,
};
use graphtrigger_model::{ChangeSet, Entity, LockSet};
use graphtrigger_storage::MemoryGraph;
use graphtrigger_types::EventKind;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Builds a module from an optional config file, triggers directory and
/// index file. The directory and index file, when given, override the ones
/// in the config file.
pub fn load_module(
    config: Option<&Path>,
    triggers: Option<&Path>,
    index: Option<&Path>,
) -> Result<TriggerModule> {
    let mut settings = match config {
        Some(path) => TriggerModuleConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TriggerModuleConfig::default(),
    };
    if let Some(dir) = triggers {
        settings = settings.with_triggers_directory(dir);
    }
    if let Some(path) = index {
        settings = settings.with_trigger_index_path(path);
    }

    let indexer = TriggerModule::open_indexer(&settings).context("failed to open trigger index")?;
    let module = TriggerModule::from_config(settings, &TriggerCatalog::with_builtins())
        .context("failed to load triggers")?;
    Ok(module.with_indexer(indexer))
}

pub fn read_change_set(path: &Path) -> Result<ChangeSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read change set {}", path.display()))?;
    let changes: ChangeSet = serde_json::from_str(&raw)
        .with_context(|| format!("invalid change set {}", path.display()))?;
    debug!(entities = changes.len(), "change set loaded");
    Ok(changes)
}

pub fn read_entities(path: &Path) -> Result<Vec<Entity>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entities {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid entity list {}", path.display()))
}

/// Runs the guard over one change set without applying anything.
pub fn check(module: &TriggerModule, changes: &ChangeSet) -> Result<(), Rejection> {
    module.before_commit(changes)
}

/// Loads `entities` into a scratch graph and runs the initial scan over it.
pub fn scan(module: &TriggerModule, entities: Vec<Entity>) -> Result<ScanReport> {
    let graph = MemoryGraph::with_entities(entities);
    module.initialize(&graph).context("initial scan failed")
}

/// Human-readable listing of subscribers and locks.
pub fn render_registry(registry: &TriggerRegistry) -> String {
    let mut out = String::new();
    let lists = [
        ("create", registry.on_create()),
        ("delete", registry.on_delete()),
        ("modify", registry.on_modify()),
        ("change", registry.on_change()),
    ];
    for (event, triggers) in lists {
        let names: Vec<&str> = triggers.iter().map(|t| t.name()).collect();
        let names = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        };
        let _ = writeln!(out, "{event:<7} {names}");
    }

    let locks = registry.locks();
    if locks.is_empty() {
        return out;
    }
    out.push_str("locks:\n");
    for event in EventKind::ALL {
        render_lock_set(&mut out, event, locks.set(event));
    }
    out
}

fn render_lock_set(out: &mut String, event: EventKind, set: &LockSet) {
    let entries = set
        .properties()
        .iter()
        .map(|e| ("property", e))
        .chain(set.labels().iter().map(|e| ("label", e)));
    for (kind, entry) in entries {
        let owner = entry.owner.as_deref().unwrap_or("module");
        let _ = writeln!(out, "  {:<7} {kind} '{}' ({owner})", event.as_str(), entry.name);
    }
}
