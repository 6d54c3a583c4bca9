//! Inclusion policies decide which entities the framework sees.
//!
//! Selector strings, as used in configuration and trigger manifests:
//! - `all`: every entity, internal ones included
//! - `none`: nothing
//! - `business` / `allBusiness`: everything not labelled `_GA_*`
//! - `label:A,B`: business entities carrying at least one of the labels
//! - `property:name`: business entities carrying the property

use crate::{Entity, ModelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Predicate over entities. Must be pure and cheap: it runs once per entity
/// per evaluation.
pub trait InclusionPolicy: Send + Sync {
    fn include(&self, entity: &Entity) -> bool;

    /// Human-readable description for logs.
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

/// The default policy: every entity that is not framework-internal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllBusiness;

impl InclusionPolicy for AllBusiness {
    fn include(&self, entity: &Entity) -> bool {
        !entity.is_internal()
    }

    fn describe(&self) -> String {
        "business".to_string()
    }
}

/// Wraps a closure as a policy.
pub struct PredicatePolicy<F> {
    name: String,
    predicate: F,
}

impl<F> PredicatePolicy<F>
where
    F: Fn(&Entity) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> InclusionPolicy for PredicatePolicy<F>
where
    F: Fn(&Entity) -> bool + Send + Sync,
{
    fn include(&self, entity: &Entity) -> bool {
        (self.predicate)(entity)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A policy that can be named in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InclusionSelector {
    All,
    None,
    #[default]
    Business,
    Labels(Vec<String>),
    Property(String),
}

impl InclusionPolicy for InclusionSelector {
    fn include(&self, entity: &Entity) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Business => AllBusiness.include(entity),
            Self::Labels(labels) => {
                AllBusiness.include(entity) && labels.iter().any(|l| entity.has_label(l))
            }
            Self::Property(name) => AllBusiness.include(entity) && entity.has_property(name),
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InclusionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::None => f.write_str("none"),
            Self::Business => f.write_str("business"),
            Self::Labels(labels) => write!(f, "label:{}", labels.join(",")),
            Self::Property(name) => write!(f, "property:{name}"),
        }
    }
}

impl FromStr for InclusionSelector {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |reason: &str| ModelError::InvalidSelector {
            selector: s.to_string(),
            reason: reason.to_string(),
        };

        if let Some(rest) = trimmed.strip_prefix("label:") {
            let labels: Vec<String> = rest
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            if labels.is_empty() {
                return Err(invalid("expected at least one label"));
            }
            return Ok(Self::Labels(labels));
        }

        if let Some(rest) = trimmed.strip_prefix("property:") {
            let name = rest.trim();
            if name.is_empty() {
                return Err(invalid("expected a property name"));
            }
            return Ok(Self::Property(name.to_string()));
        }

        match trimmed {
            "all" => Ok(Self::All),
            "none" => Ok(Self::None),
            "business" | "allBusiness" | "" => Ok(Self::Business),
            _ => Err(invalid("unknown selector")),
        }
    }
}

impl TryFrom<String> for InclusionSelector {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InclusionSelector> for String {
    fn from(value: InclusionSelector) -> Self {
        value.to_string()
    }
}
