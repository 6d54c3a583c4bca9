//! Handlers available to every manifest without custom registration.
//!
//! | catalog name         | params                       |
//! |----------------------|------------------------------|
//! | `allow`              | none                         |
//! | `reject`             | `reason` (string, optional)  |
//! | `require-properties` | `properties` (string list)   |
//! | `forbid-labels`      | `labels` (string list)       |

use crate::{GuardError, GuardResult};
use graphtrigger_model::{Entity, HandlerResult, TriggerHandler};
use graphtrigger_types::EventKind;

/// Accepts everything. Useful for triggers that only contribute locks.
#[derive(Debug, Default, Clone, Copy)]
pub struct Allow;

impl TriggerHandler for Allow {}

/// Vetoes every event it is subscribed to.
#[derive(Debug, Clone)]
pub struct Reject {
    reason: String,
}

impl Reject {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub(crate) fn from_params(params: &toml::Table) -> GuardResult<Self> {
        let reason = match params.get("reason") {
            None => "rejected by trigger".to_string(),
            Some(toml::Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(GuardError::HandlerParams {
                    handler: "reject".to_string(),
                    reason: format!("'reason' must be a string, got {}", other.type_str()),
                });
            }
        };
        Ok(Self { reason })
    }
}

impl TriggerHandler for Reject {
    fn on_create(&self, _entity: &Entity) -> HandlerResult {
        Err(self.reason.clone())
    }

    fn on_delete(&self, _entity: &Entity) -> HandlerResult {
        Err(self.reason.clone())
    }

    fn on_modify(&self, _previous: &Entity, _current: &Entity) -> HandlerResult {
        Err(self.reason.clone())
    }

    fn on_change(&self, _event: EventKind, _previous: Option<&Entity>, _current: Option<&Entity>) -> HandlerResult {
        Err(self.reason.clone())
    }
}

/// Requires created and modified entities to carry every listed property.
#[derive(Debug, Clone)]
pub struct RequireProperties {
    properties: Vec<String>,
}

impl RequireProperties {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_params(params: &toml::Table) -> GuardResult<Self> {
        Ok(Self::new(string_list(params, "properties", "require-properties")?))
    }

    fn check(&self, entity: &Entity) -> HandlerResult {
        match self.properties.iter().find(|p| !entity.has_property(p)) {
            Some(missing) => Err(format!("missing required property '{missing}'")),
            None => Ok(()),
        }
    }
}

impl TriggerHandler for RequireProperties {
    fn on_create(&self, entity: &Entity) -> HandlerResult {
        self.check(entity)
    }

    fn on_modify(&self, _previous: &Entity, current: &Entity) -> HandlerResult {
        self.check(current)
    }

    fn on_change(&self, _event: EventKind, _previous: Option<&Entity>, current: Option<&Entity>) -> HandlerResult {
        current.map_or(Ok(()), |entity| self.check(entity))
    }
}

/// Refuses created and modified entities carrying any listed label.
#[derive(Debug, Clone)]
pub struct ForbidLabels {
    labels: Vec<String>,
}

impl ForbidLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_params(params: &toml::Table) -> GuardResult<Self> {
        Ok(Self::new(string_list(params, "labels", "forbid-labels")?))
    }

    fn check(&self, entity: &Entity) -> HandlerResult {
        match self.labels.iter().find(|l| entity.has_label(l)) {
            Some(label) => Err(format!("label '{label}' is not allowed")),
            None => Ok(()),
        }
    }
}

impl TriggerHandler for ForbidLabels {
    fn on_create(&self, entity: &Entity) -> HandlerResult {
        self.check(entity)
    }

    fn on_modify(&self, _previous: &Entity, current: &Entity) -> HandlerResult {
        self.check(current)
    }

    fn on_change(&self, _event: EventKind, _previous: Option<&Entity>, current: Option<&Entity>) -> HandlerResult {
        current.map_or(Ok(()), |entity| self.check(entity))
    }
}

fn string_list(params: &toml::Table, key: &str, handler: &str) -> GuardResult<Vec<String>> {
    let invalid = |reason: String| GuardError::HandlerParams {
        handler: handler.to_string(),
        reason,
    };

    let Some(value) = params.get(key) else {
        return Err(invalid(format!("missing '{key}'")));
    };
    let Some(items) = value.as_array() else {
        return Err(invalid(format!("'{key}' must be a list of strings")));
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(format!("'{key}' must be a list of strings")))
        })
        .collect()
}
