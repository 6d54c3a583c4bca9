//! Property-based tests for commit guard behaviour.
//!
//! Covers the lock invariant, interest filtering, veto short-circuiting and
//! dispatch determinism over generated entities and registries.

mod common;

use common::{CallLog, RecordingHandler};
use graphtrigger_guard::{CommitGuard, Rejection, TriggerRegistry};
use graphtrigger_model::{ChangeSet, Entity, LockPolicy, TriggerDefinition};
use graphtrigger_types::{EntityId, EventKind, PropertyValue};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

const NAMES: [&str; 5] = ["uid", "status", "name", "total", "tag"];

fn value_strategy() -> impl Strategy<Value = PropertyValue> {
    prop_oneof![
        any::<bool>().prop_map(PropertyValue::Bool),
        (-5i64..5).prop_map(PropertyValue::Int),
        "[a-c]{1,2}".prop_map(PropertyValue::String),
    ]
}

fn properties_strategy() -> impl Strategy<Value = BTreeMap<String, PropertyValue>> {
    prop::collection::btree_map(
        prop::sample::select(NAMES.to_vec()).prop_map(str::to_string),
        value_strategy(),
        0..5,
    )
}

fn entity_strategy(n: u128) -> impl Strategy<Value = Entity> {
    properties_strategy().prop_map(move |properties| {
        let mut entity = Entity::new(EntityId::from_u128(n)).with_label("Node");
        entity.properties = properties;
        entity
    })
}

fn recorder(name: &str, log: &CallLog) -> Arc<RecordingHandler> {
    Arc::new(RecordingHandler::new(name, log))
}

// =============================================================================
// LOCK INVARIANT
// =============================================================================

proptest! {
    #[test]
    fn create_lock_rejects_iff_property_present(entity in entity_strategy(1)) {
        let log = CallLog::new();
        let registry = TriggerRegistry::builder()
            .locks(LockPolicy::new().lock_property(EventKind::Create, "uid"))
            .register(
                TriggerDefinition::builder("T", recorder("T", &log))
                    .on_create()
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let guard = CommitGuard::new(registry);

        let result = guard.evaluate(&ChangeSet::new().with_created(entity.clone()));
        if entity.has_property("uid") {
            let is_uid_violation = matches!(
                result,
                Err(Rejection::LockViolation(ref v)) if v.name == "uid" && v.phase == EventKind::Create
            );
            prop_assert!(is_uid_violation);
            prop_assert_eq!(log.entries().len(), 0);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(log.entries(), vec!["T:create".to_string()]);
        }
    }

    #[test]
    fn modify_lock_rejects_iff_value_differs(
        previous in entity_strategy(1),
        current in entity_strategy(1),
    ) {
        let guard = CommitGuard::new(
            TriggerRegistry::builder()
                .locks(LockPolicy::new().lock_property(EventKind::Modify, "uid"))
                .build()
                .unwrap(),
        );
        let differs = previous.property("uid") != current.property("uid");
        let result = guard.evaluate(&ChangeSet::new().with_changed(previous, current));
        prop_assert_eq!(result.is_err(), differs);
    }
}

// =============================================================================
// INTEREST FILTERING
// =============================================================================

proptest! {
    #[test]
    fn status_interest_fires_iff_status_differs(
        previous in entity_strategy(1),
        current in entity_strategy(1),
    ) {
        let log = CallLog::new();
        let def = TriggerDefinition::builder("S", recorder("S", &log))
            .on_modify()
            .when_properties_change(["status"])
            .build()
            .unwrap();
        let guard = CommitGuard::new(TriggerRegistry::builder().register(def).build().unwrap());

        let differs = previous.property("status") != current.property("status");
        guard.evaluate(&ChangeSet::new().with_changed(previous, current)).unwrap();
        prop_assert_eq!(log.count("S:modify"), usize::from(differs));
    }

    #[test]
    fn empty_interest_fires_on_every_change(
        previous in entity_strategy(1),
        current in entity_strategy(1),
    ) {
        let log = CallLog::new();
        let def = TriggerDefinition::builder("A", recorder("A", &log))
            .on_modify()
            .build()
            .unwrap();
        let guard = CommitGuard::new(TriggerRegistry::builder().register(def).build().unwrap());

        guard.evaluate(&ChangeSet::new().with_changed(previous, current)).unwrap();
        prop_assert_eq!(log.count("A:modify"), 1);
    }

    #[test]
    fn identical_snapshots_fire_nothing_under_interest(
        entity in entity_strategy(1),
        watched in prop::collection::vec(prop::sample::select(NAMES.to_vec()), 1..4),
    ) {
        let log = CallLog::new();
        let def = TriggerDefinition::builder("W", recorder("W", &log))
            .on_modify()
            .on_change()
            .when_properties_change(watched)
            .build()
            .unwrap();
        let guard = CommitGuard::new(TriggerRegistry::builder().register(def).build().unwrap());

        guard.evaluate(&ChangeSet::new().with_changed(entity.clone(), entity)).unwrap();
        prop_assert!(log.entries().is_empty());
    }
}

// =============================================================================
// VETO AND ORDERING
// =============================================================================

proptest! {
    #[test]
    fn first_veto_stops_all_later_subscribers(
        entity in entity_strategy(1),
        followers in 1usize..5,
    ) {
        let log = CallLog::new();
        let mut builder = TriggerRegistry::builder().register(
            TriggerDefinition::builder(
                "gate",
                Arc::new(RecordingHandler::new("gate", &log).vetoing(EventKind::Create)),
            )
            .on_create()
            .on_change()
            .build()
            .unwrap(),
        );
        for i in 0..followers {
            let name = format!("f{i}");
            builder = builder.register(
                TriggerDefinition::builder(name.as_str(), recorder(&name, &log))
                    .on_create()
                    .on_change()
                    .build()
                    .unwrap(),
            );
        }
        let guard = CommitGuard::new(builder.build().unwrap());

        let result = guard.evaluate(&ChangeSet::new().with_created(entity));
        let is_gate_veto = matches!(result, Err(Rejection::TriggerVeto { ref trigger, .. }) if trigger == "gate");
        prop_assert!(is_gate_veto);
        prop_assert_eq!(log.entries(), vec!["gate:create".to_string()]);
    }

    #[test]
    fn invocation_sequence_is_deterministic(
        created in entity_strategy(1),
        deleted in entity_strategy(2),
        previous in entity_strategy(3),
        current in entity_strategy(3),
    ) {
        let log = CallLog::new();
        let registry = ["T1", "T2", "T3"]
            .iter()
            .fold(TriggerRegistry::builder(), |b, name| {
                b.register(
                    TriggerDefinition::builder(*name, recorder(name, &log))
                        .on_create()
                        .on_delete()
                        .on_modify()
                        .on_change()
                        .build()
                        .unwrap(),
                )
            })
            .build()
            .unwrap();
        let guard = CommitGuard::new(registry);
        let changes = ChangeSet::new()
            .with_created(created)
            .with_deleted(deleted)
            .with_changed(previous, current);

        guard.evaluate(&changes).unwrap();
        let first = log.entries();
        log.clear();
        guard.evaluate(&changes).unwrap();
        prop_assert_eq!(&first, &log.entries());

        let creates: Vec<&String> = first.iter().filter(|e| e.ends_with(":create") && !e.contains("change")).collect();
        prop_assert_eq!(creates, vec!["T1:create", "T2:create", "T3:create"]);
    }
}
