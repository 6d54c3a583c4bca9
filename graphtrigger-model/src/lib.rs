//! Core trigger model for graphtrigger.
//!
//! Defines the types the commit guard and every trigger author depend on:
//! - [`Entity`]: a graph node snapshot (id, labels, properties)
//! - [`ChangeSet`]: created, deleted and changed entities of one commit
//! - [`InclusionPolicy`]: which entities the framework sees at all
//! - [`TriggerHandler`]: the four callbacks a trigger may implement
//! - [`TriggerDefinition`]: name, subscriptions, interest filters, locks
//! - [`LockPolicy`]: property/label names that only the framework may touch
//!
//! These types carry no storage or transaction logic. The guard crate
//! consumes them; storage engines only ever build [`Entity`] values.

mod changeset;
mod entity;
mod error;
mod handler;
mod inclusion;
mod interest;
mod lock;
mod trigger;

pub use changeset::{Change, ChangeSet};
pub use entity::{Entity, INTERNAL_PREFIX};
pub use error::{ModelError, ModelResult};
pub use handler::{HandlerResult, TriggerHandler};
pub use inclusion::{AllBusiness, InclusionPolicy, InclusionSelector, PredicatePolicy};
pub use interest::{label_changed, property_changed};
pub use lock::{LockEntry, LockKind, LockPolicy, LockSet, LockViolation};
pub use trigger::{Subscriptions, TriggerBuilder, TriggerDefinition};
