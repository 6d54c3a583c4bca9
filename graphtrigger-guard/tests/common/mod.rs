//! Shared test helpers for guard tests.

#![allow(dead_code)]

use graphtrigger_model::{Entity, HandlerResult, TriggerHandler};
use graphtrigger_types::{EntityId, EventKind};
use std::sync::{Arc, Mutex};

/// Shared, ordered record of handler invocations.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Records every callback as `"<name>:<callback>"` and optionally vetoes.
pub struct RecordingHandler {
    name: String,
    log: CallLog,
    veto: Option<EventKind>,
    veto_change: bool,
    panic_on_create: bool,
}

impl RecordingHandler {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            veto: None,
            veto_change: false,
            panic_on_create: false,
        }
    }

    /// Vetoes the dedicated callback for `event`.
    pub fn vetoing(mut self, event: EventKind) -> Self {
        self.veto = Some(event);
        self
    }

    /// Vetoes every `on_change` call.
    pub fn vetoing_change(mut self) -> Self {
        self.veto_change = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_create = true;
        self
    }

    fn record(&self, callback: &str, event: EventKind) -> HandlerResult {
        self.log.push(format!("{}:{callback}", self.name));
        if self.veto == Some(event) {
            return Err(format!("{} says no", self.name));
        }
        Ok(())
    }
}

impl TriggerHandler for RecordingHandler {
    fn on_create(&self, _entity: &Entity) -> HandlerResult {
        if self.panic_on_create {
            panic!("{} exploded", self.name);
        }
        self.record("create", EventKind::Create)
    }

    fn on_delete(&self, _entity: &Entity) -> HandlerResult {
        self.record("delete", EventKind::Delete)
    }

    fn on_modify(&self, _previous: &Entity, _current: &Entity) -> HandlerResult {
        self.record("modify", EventKind::Modify)
    }

    fn on_change(&self, event: EventKind, _previous: Option<&Entity>, _current: Option<&Entity>) -> HandlerResult {
        self.log.push(format!("{}:change:{event}", self.name));
        if self.veto_change {
            return Err(format!("{} says no", self.name));
        }
        Ok(())
    }
}

pub fn id(n: u128) -> EntityId {
    EntityId::from_u128(n)
}

pub fn node(n: u128) -> Entity {
    Entity::new(id(n)).with_label("Person")
}
