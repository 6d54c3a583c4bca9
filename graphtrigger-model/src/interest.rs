use crate::Entity;

/// True if `name` holds different values on the two snapshots.
///
/// Missing on one side and present on the other counts as a change; missing
/// on both does not.
pub fn property_changed(previous: &Entity, current: &Entity, name: &str) -> bool {
    previous.property(name) != current.property(name)
}

/// True if `label` was added or removed between the two snapshots.
pub fn label_changed(previous: &Entity, current: &Entity, label: &str) -> bool {
    previous.has_label(label) != current.has_label(label)
}
