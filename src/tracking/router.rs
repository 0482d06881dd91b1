//! Tracking event router
//!
//! Applies a provider batch to the lifecycle manager: every addition first,
//! then every update (dispatched by tracking status), then every removal.

use crate::lifecycle::{EntityLifecycleManager, Outcome};
use crate::scene::Scene;

use super::{TrackingBatch, TrackingStatus};

/// Per-batch tally of lifecycle outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub spawned: usize,
    pub replaced: usize,
    pub updated: usize,
    pub hidden: usize,
    pub destroyed: usize,
    pub ignored: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Spawned => self.spawned += 1,
            Outcome::Replaced => self.replaced += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Hidden => self.hidden += 1,
            Outcome::Destroyed => self.destroyed += 1,
            Outcome::Ignored => self.ignored += 1,
        }
    }

    /// Accumulate another summary into this one
    pub fn merge(&mut self, other: &BatchSummary) {
        self.spawned += other.spawned;
        self.replaced += other.replaced;
        self.updated += other.updated;
        self.hidden += other.hidden;
        self.destroyed += other.destroyed;
        self.ignored += other.ignored;
    }

    pub fn total(&self) -> usize {
        self.spawned + self.replaced + self.updated + self.hidden + self.destroyed + self.ignored
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "spawned={} replaced={} updated={} hidden={} destroyed={} ignored={}",
            self.spawned, self.replaced, self.updated, self.hidden, self.destroyed, self.ignored
        )
    }
}

/// Dispatches provider batches into an owned lifecycle manager
#[derive(Debug)]
pub struct TrackingRouter<S: Scene> {
    manager: EntityLifecycleManager<S>,
}

impl<S: Scene> TrackingRouter<S> {
    pub fn new(manager: EntityLifecycleManager<S>) -> Self {
        Self { manager }
    }

    /// Apply one batch in add → update → remove order
    pub fn handle_batch(&mut self, batch: &TrackingBatch) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for object in &batch.added {
            summary.record(self.manager.on_added(&object.name, object.pose()));
        }

        for object in &batch.updated {
            let outcome = match object.status {
                TrackingStatus::Tracking => self.manager.on_tracking(&object.name, object.pose()),
                TrackingStatus::Limited => self.manager.on_limited(&object.name, object.pose()),
                TrackingStatus::None => self.manager.on_none(&object.name),
            };
            summary.record(outcome);
        }

        for object in &batch.removed {
            summary.record(self.manager.on_removed(&object.name));
        }

        tracing::debug!("Batch applied ({} records): {}", batch.len(), summary);
        summary
    }

    pub fn manager(&self) -> &EntityLifecycleManager<S> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EntityLifecycleManager<S> {
        &mut self.manager
    }

    pub fn into_manager(self) -> EntityLifecycleManager<S> {
        self.manager
    }
}
