use graphtrigger_model::{AllBusiness, Entity, InclusionPolicy, InclusionSelector, PredicatePolicy};
use graphtrigger_types::{EntityId, PropertyValue};
use pretty_assertions::assert_eq;

fn make_entity() -> Entity {
    Entity::new(EntityId::from_u128(1))
        .with_label("Person")
        .with_property("name", "Alice")
        .with_property("age", 42)
}

// ── Construction & accessors ─────────────────────────────────────

#[test]
fn new_entity_is_empty() {
    let e = Entity::new(EntityId::from_u128(9));
    assert!(e.labels.is_empty());
    assert!(e.properties.is_empty());
    assert!(!e.is_internal());
}

#[test]
fn builder_sets_labels_and_properties() {
    let e = make_entity();
    assert!(e.has_label("Person"));
    assert_eq!(e.property("name"), Some(&PropertyValue::from("Alice")));
    assert_eq!(e.property("age").and_then(PropertyValue::as_i64), Some(42));
    assert!(!e.has_property("email"));
}

#[test]
fn set_property_returns_previous_value() {
    let mut e = make_entity();
    let old = e.set_property("name", "Bob");
    assert_eq!(old, Some(PropertyValue::from("Alice")));
    assert_eq!(e.remove_property("name"), Some(PropertyValue::from("Bob")));
    assert!(!e.has_property("name"));
}

#[test]
fn label_add_remove_report_membership() {
    let mut e = make_entity();
    assert!(!e.add_label("Person"));
    assert!(e.add_label("Admin"));
    assert!(e.remove_label("Admin"));
    assert!(!e.remove_label("Admin"));
}

#[test]
fn internal_label_marks_entity_internal() {
    let e = make_entity().with_label("_GA_TX_STATE");
    assert!(e.is_internal());
}

#[test]
fn entity_json_roundtrip_keeps_order() {
    let e = make_entity();
    let json = serde_json::to_string(&e).unwrap();
    let back: Entity = serde_json::from_str(&json).unwrap();
    assert_eq!(e, back);
}

#[test]
fn entity_deserializes_without_labels() {
    let id = EntityId::from_u128(3);
    let json = format!(r#"{{"id":"{id}","properties":{{"n":1}}}}"#);
    let e: Entity = serde_json::from_str(&json).unwrap();
    assert!(e.labels.is_empty());
    assert_eq!(e.property("n"), Some(&PropertyValue::Int(1)));
}

// ── Inclusion policies ───────────────────────────────────────────

#[test]
fn all_business_excludes_internal_entities() {
    assert!(AllBusiness.include(&make_entity()));
    assert!(!AllBusiness.include(&make_entity().with_label("_GA_Metadata")));
}

#[test]
fn selector_parse_variants() {
    assert_eq!("all".parse::<InclusionSelector>().unwrap(), InclusionSelector::All);
    assert_eq!("none".parse::<InclusionSelector>().unwrap(), InclusionSelector::None);
    assert_eq!("allBusiness".parse::<InclusionSelector>().unwrap(), InclusionSelector::Business);
    assert_eq!(
        "label: Person, Company".parse::<InclusionSelector>().unwrap(),
        InclusionSelector::Labels(vec!["Person".into(), "Company".into()])
    );
    assert_eq!(
        "property:uid".parse::<InclusionSelector>().unwrap(),
        InclusionSelector::Property("uid".into())
    );
}

#[test]
fn selector_parse_rejects_garbage() {
    assert!("label:".parse::<InclusionSelector>().is_err());
    assert!("property: ".parse::<InclusionSelector>().is_err());
    assert!("everything".parse::<InclusionSelector>().is_err());
}

#[test]
fn selector_display_parses_back() {
    for s in ["all", "none", "business", "label:A,B", "property:uid"] {
        let selector: InclusionSelector = s.parse().unwrap();
        assert_eq!(selector.to_string(), s);
    }
}

#[test]
fn label_selector_requires_label_and_business() {
    let selector: InclusionSelector = "label:Person".parse().unwrap();
    assert!(selector.include(&make_entity()));
    assert!(!selector.include(&Entity::new(EntityId::from_u128(2))));
    assert!(!selector.include(&make_entity().with_label("_GA_X")));
}

#[test]
fn all_selector_includes_internal() {
    assert!(InclusionSelector::All.include(&make_entity().with_label("_GA_X")));
    assert!(!InclusionSelector::None.include(&make_entity()));
}

#[test]
fn selector_serde_as_string() {
    let selector = InclusionSelector::Labels(vec!["A".into()]);
    let json = serde_json::to_string(&selector).unwrap();
    assert_eq!(json, "\"label:A\"");
    let back: InclusionSelector = serde_json::from_str(&json).unwrap();
    assert_eq!(back, selector);
}

#[test]
fn predicate_policy_wraps_closure() {
    let adults = PredicatePolicy::new("adults", |e: &Entity| {
        e.property("age").and_then(PropertyValue::as_i64).unwrap_or(0) >= 18
    });
    assert!(adults.include(&make_entity()));
    assert!(!adults.include(&make_entity().with_property("age", 3)));
    assert_eq!(adults.describe(), "adults");
}
