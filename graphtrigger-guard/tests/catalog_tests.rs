use graphtrigger_guard::{
    load_manifests, CommitGuard, GuardError, ManifestEvent, Rejection, TriggerCatalog,
    TriggerManifest, TriggerRegistry,
};
use graphtrigger_model::{ChangeSet, Entity, HandlerResult, TriggerHandler};
use graphtrigger_types::{EntityId, EventKind};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

const UUID_MANIFEST: &str = r#"
[[trigger]]
name = "uuid"
handler = "require-properties"
events = ["create", "modify"]
when_properties_change = ["uuid"]
inclusion = "label:Person"

[trigger.params]
properties = ["uuid"]

[trigger.locks.modify]
properties = ["uuid"]
"#;

fn person(n: u128) -> Entity {
    Entity::new(EntityId::from_u128(n)).with_label("Person")
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

// ── Manifest parsing ─────────────────────────────────────────────

#[test]
fn parse_full_trigger_table() {
    let manifest = TriggerManifest::parse(UUID_MANIFEST).unwrap();
    assert_eq!(manifest.triggers.len(), 1);

    let spec = &manifest.triggers[0];
    assert_eq!(spec.name, "uuid");
    assert_eq!(spec.handler, "require-properties");
    assert_eq!(spec.events, vec![ManifestEvent::Create, ManifestEvent::Modify]);
    assert_eq!(spec.when_properties_change, vec!["uuid"]);
    assert_eq!(spec.locks.modify.properties, vec!["uuid"]);
    assert!(spec.locks.create.properties.is_empty());

    let policy = spec.locks.to_policy();
    assert!(policy.set(EventKind::Modify).locks_property("uuid"));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = TriggerManifest::parse("[[trigger]]\nname = \"x\"\nhandler = \"allow\"\nevnts = []\n");
    assert!(err.is_err());
}

#[test]
fn empty_manifest_has_no_triggers() {
    assert!(TriggerManifest::parse("").unwrap().triggers.is_empty());
}

// ── Catalog ──────────────────────────────────────────────────────

#[test]
fn builtins_are_registered() {
    let catalog = TriggerCatalog::with_builtins();
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(names, vec!["allow", "forbid-labels", "reject", "require-properties"]);
    assert!(!TriggerCatalog::new().contains("allow"));
}

#[test]
fn build_definition_from_spec() {
    let catalog = TriggerCatalog::with_builtins();
    let manifest = TriggerManifest::parse(UUID_MANIFEST).unwrap();
    let def = catalog.build_definition(&manifest.triggers[0]).unwrap();

    assert_eq!(def.name(), "uuid");
    assert!(def.subscriptions().create && def.subscriptions().modify);
    assert!(!def.subscriptions().delete);
    assert!(def.includes(&person(1)));
    assert!(!def.includes(&Entity::new(EntityId::from_u128(2))));
    assert!(def.handler().on_create(&person(1)).is_err());
    assert!(def.handler().on_create(&person(1).with_property("uuid", "u")).is_ok());
}

#[test]
fn unknown_handler_is_an_error() {
    let catalog = TriggerCatalog::with_builtins();
    let manifest = TriggerManifest::parse("[[trigger]]\nname = \"x\"\nhandler = \"script\"\n").unwrap();
    let err = catalog.build_definition(&manifest.triggers[0]).unwrap_err();
    assert!(matches!(
        err,
        GuardError::UnknownHandler { ref trigger, ref handler } if trigger == "x" && handler == "script"
    ));
}

#[test]
fn bad_params_are_reported() {
    let catalog = TriggerCatalog::with_builtins();
    let manifest =
        TriggerManifest::parse("[[trigger]]\nname = \"x\"\nhandler = \"forbid-labels\"\n").unwrap();
    assert!(matches!(
        catalog.build_definition(&manifest.triggers[0]),
        Err(GuardError::HandlerParams { .. })
    ));
}

struct CountProps {
    max: usize,
}

impl TriggerHandler for CountProps {
    fn on_create(&self, entity: &Entity) -> HandlerResult {
        if entity.properties.len() > self.max {
            return Err(format!("more than {} properties", self.max));
        }
        Ok(())
    }
}

#[test]
fn custom_factory_receives_params() {
    let mut catalog = TriggerCatalog::new();
    catalog.register("max-props", |params| {
        let max = params.get("max").and_then(|v| v.as_integer()).unwrap_or(1) as usize;
        Ok(Arc::new(CountProps { max }) as Arc<dyn TriggerHandler>)
    });
    let manifest = TriggerManifest::parse(
        "[[trigger]]\nname = \"small\"\nhandler = \"max-props\"\nevents = [\"create\"]\nparams = { max = 1 }\n",
    )
    .unwrap();
    let def = catalog.build_definition(&manifest.triggers[0]).unwrap();

    let guard = CommitGuard::new(TriggerRegistry::builder().register(def).build().unwrap());
    let big = person(1).with_property("a", 1).with_property("b", 2);
    assert!(matches!(
        guard.evaluate(&ChangeSet::new().with_created(big)),
        Err(Rejection::TriggerVeto { ref reason, .. }) if reason == "more than 1 properties"
    ));
}

// ── Directory loading ────────────────────────────────────────────

#[test]
fn directory_loads_in_file_name_order() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "20-second.toml",
        "[[trigger]]\nname = \"c\"\nhandler = \"allow\"\n",
    );
    write(
        dir.path(),
        "10-first.toml",
        "[[trigger]]\nname = \"a\"\nhandler = \"allow\"\n\n[[trigger]]\nname = \"b\"\nhandler = \"allow\"\n",
    );
    write(dir.path(), "README.md", "not a manifest");

    let specs = load_manifests(dir.path()).unwrap();
    let names: Vec<&str> = specs.iter().map(|(_, s)| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert!(specs[2].0.ends_with("20-second.toml"));

    let defs = TriggerCatalog::with_builtins().load_directory(dir.path()).unwrap();
    assert_eq!(defs.len(), 3);
}

#[test]
fn broken_manifest_names_its_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.toml", "[[trigger]\n");
    let err = load_manifests(dir.path()).unwrap_err();
    match err {
        GuardError::Manifest { path, .. } => assert!(path.ends_with("bad.toml")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_manifests(&dir.path().join("nope")),
        Err(GuardError::Io(_))
    ));
}

#[test]
fn loaded_triggers_enforce_manifest_locks() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "uuid.toml", UUID_MANIFEST);
    let defs = TriggerCatalog::with_builtins().load_directory(dir.path()).unwrap();
    let guard = CommitGuard::new(TriggerRegistry::builder().register_all(defs).build().unwrap());

    let before = person(1).with_property("uuid", "a");
    let after = person(1).with_property("uuid", "b");
    let err = guard
        .evaluate(&ChangeSet::new().with_changed(before, after))
        .unwrap_err();
    assert_eq!(err.trigger(), Some("uuid"));
}

// ── Built-in handlers ────────────────────────────────────────────

#[test]
fn reject_handler_vetoes_deletes() {
    let manifest = TriggerManifest::parse(
        "[[trigger]]\nname = \"frozen\"\nhandler = \"reject\"\nevents = [\"delete\"]\nparams = { reason = \"frozen\" }\n",
    )
    .unwrap();
    let def = TriggerCatalog::with_builtins()
        .build_definition(&manifest.triggers[0])
        .unwrap();
    let guard = CommitGuard::new(TriggerRegistry::builder().register(def).build().unwrap());

    assert!(guard.evaluate(&ChangeSet::new().with_created(person(1))).is_ok());
    assert_eq!(
        guard.evaluate(&ChangeSet::new().with_deleted(person(2))),
        Err(Rejection::TriggerVeto {
            trigger: "frozen".into(),
            event: EventKind::Delete,
            entity: EntityId::from_u128(2),
            reason: "frozen".into(),
        })
    );
}

#[test]
fn forbid_labels_handler_checks_current_snapshot() {
    let manifest = TriggerManifest::parse(
        "[[trigger]]\nname = \"no-admin\"\nhandler = \"forbid-labels\"\nevents = [\"change\"]\nparams = { labels = [\"Admin\"] }\n",
    )
    .unwrap();
    let def = TriggerCatalog::with_builtins()
        .build_definition(&manifest.triggers[0])
        .unwrap();
    let guard = CommitGuard::new(TriggerRegistry::builder().register(def).build().unwrap());

    let admin = person(1).with_label("Admin");
    assert!(guard
        .evaluate(&ChangeSet::new().with_changed(person(1), admin.clone()))
        .is_err());
    assert!(guard.evaluate(&ChangeSet::new().with_deleted(admin)).is_ok());
}
