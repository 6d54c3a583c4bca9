//! One-time pass over entities that existed before the module started.
//!
//! Pre-existing entities are offered to create subscribers as if they had
//! just been created, so triggers can build whatever state they keep. No
//! transaction is involved: locks are not checked and a veto only skips the
//! entity.

use crate::guard::run_handler;
use crate::TriggerRegistry;
use graphtrigger_model::{Entity, InclusionPolicy};
use graphtrigger_types::EntityId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort an initial scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("entity source failed at offset {offset}: {reason}")]
    Source { offset: usize, reason: String },

    #[error("scan visitor failed on entity {entity}: {reason}")]
    Visitor { entity: EntityId, reason: String },
}

/// Paged read access to the whole entity population.
pub trait EntitySource {
    /// Up to `limit` entities starting at `offset`, in a stable order.
    /// An empty result ends the scan.
    fn batch(&self, offset: usize, limit: usize) -> Result<Vec<Entity>, ScanError>;
}

/// Counters for one completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub batches: usize,
    pub scanned: usize,
    /// Entities that passed the inclusion policy.
    pub offered: usize,
    pub vetoes: usize,
}

pub struct InitialScanner {
    registry: Arc<TriggerRegistry>,
    inclusion: Arc<dyn InclusionPolicy>,
    batch_size: usize,
}

impl InitialScanner {
    pub fn new(
        registry: Arc<TriggerRegistry>,
        inclusion: Arc<dyn InclusionPolicy>,
        batch_size: usize,
    ) -> Self {
        Self {
            registry,
            inclusion,
            batch_size,
        }
    }

    pub fn scan(&self, source: &dyn EntitySource) -> Result<ScanReport, ScanError> {
        self.scan_with(source, |_| Ok(()))
    }

    /// Scans, calling `visit` on every entity read (included or not) before
    /// it is offered to triggers.
    pub fn scan_with<V>(&self, source: &dyn EntitySource, mut visit: V) -> Result<ScanReport, ScanError>
    where
        V: FnMut(&Entity) -> Result<(), ScanError>,
    {
        if self.batch_size == 0 {
            return Err(ScanError::ZeroBatchSize);
        }

        let mut report = ScanReport::default();
        let mut offset = 0;

        loop {
            let batch = source.batch(offset, self.batch_size)?;
            if batch.is_empty() {
                break;
            }
            report.batches += 1;
            debug!(offset, size = batch.len(), "scanning batch");

            for entity in &batch {
                report.scanned += 1;
                visit(entity)?;

                if !self.inclusion.include(entity) {
                    continue;
                }
                report.offered += 1;

                if !self.offer(entity) {
                    report.vetoes += 1;
                }
            }

            if batch.len() < self.batch_size {
                break;
            }
            offset += batch.len();
        }

        info!(
            batches = report.batches,
            scanned = report.scanned,
            offered = report.offered,
            vetoes = report.vetoes,
            "initial scan complete"
        );
        Ok(report)
    }

    /// Offers one entity to the create subscribers. Returns false if one of
    /// them vetoed, in which case the rest are skipped.
    fn offer(&self, entity: &Entity) -> bool {
        for trigger in self.registry.on_create().iter().filter(|t| t.includes(entity)) {
            let Err(reason) = run_handler(|| trigger.handler().on_create(entity)) else {
                continue;
            };
            warn!(
                trigger = trigger.name(),
                entity = %entity.id,
                "trigger vetoed pre-existing entity: {reason}"
            );
            return false;
        }
        true
    }
}
