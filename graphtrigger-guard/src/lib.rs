//! Commit guard and trigger dispatch for graphtrigger.
//!
//! For every transaction about to commit, the [`CommitGuard`] walks the
//! [`ChangeSet`](graphtrigger_model::ChangeSet) in a fixed order (creates,
//! then deletes, then modifications), enforces the registry's lock policy and
//! calls each subscribed trigger. The first lock violation or handler veto
//! rejects the whole commit.
//!
//! Around the guard sit the pieces a host needs to run it:
//! - [`TriggerRegistry`]: immutable subscriber lists plus the merged locks
//! - [`InitialScanner`]: one-off pass over pre-existing entities
//! - [`TriggerModuleConfig`]: bootstrap settings from maps or TOML
//! - [`TriggerCatalog`]: handler factories used by trigger manifests
//! - [`TriggerModule`]: the runtime object a storage engine hooks into

pub mod builtin;
mod catalog;
mod config;
mod error;
mod guard;
mod hook;
mod manifest;
mod module;
mod registry;
mod scanner;

pub use catalog::{HandlerFactory, TriggerCatalog};
pub use config::TriggerModuleConfig;
pub use error::{GuardError, GuardResult, Rejection};
pub use guard::CommitGuard;
pub use hook::CommitHook;
pub use manifest::{
    load_manifests, ManifestEvent, ManifestLockSet, ManifestLocks, TriggerManifest, TriggerSpec,
};
pub use module::TriggerModule;
pub use registry::{RegistryBuilder, TriggerRegistry};
pub use scanner::{EntitySource, InitialScanner, ScanError, ScanReport};
