//! Tracker service
//!
//! Owns the router (and through it the lifecycle manager) plus the receiving
//! half of the batch channel. Providers on any task push into the channel;
//! batches are applied one at a time on whichever task drives the service.

use tokio::sync::{broadcast, mpsc};

use crate::config::Config;
use crate::error::ArspawnError;
use crate::lifecycle::EntityLifecycleManager;
use crate::scene::Scene;
use crate::tracking::{BatchSink, BatchSummary, TrackingBatch, TrackingProvider, TrackingRouter};

/// Serializes provider batches into a single router
#[derive(Debug)]
pub struct TrackerService<S: Scene> {
    router: TrackingRouter<S>,
    sink: BatchSink,
    batch_rx: mpsc::UnboundedReceiver<TrackingBatch>,
    totals: BatchSummary,
    batches_applied: usize,
}

impl<S: Scene> TrackerService<S> {
    pub fn new(router: TrackingRouter<S>) -> Self {
        let (sink, batch_rx) = mpsc::unbounded_channel();
        Self {
            router,
            sink,
            batch_rx,
            totals: BatchSummary::default(),
            batches_applied: 0,
        }
    }

    /// Build the full tracker stack from configuration
    pub fn from_config(config: &Config, scene: S) -> Self {
        let manager =
            EntityLifecycleManager::with_policy(config.registry(), scene, config.tracker.duplicate_policy);
        Self::new(TrackingRouter::new(manager))
    }

    /// Register this service as the provider's sole listener
    pub fn start(&self, provider: &dyn TrackingProvider) -> Result<(), ArspawnError> {
        provider.attach(self.sink.clone())?;
        tracing::info!("Tracker armed ({} prefabs)", self.router.manager().registry().len());
        Ok(())
    }

    /// Deregister from the provider; batches already queued are still applied
    ///
    /// Only this service's own listener is removed. Returns false if another
    /// listener owns the provider.
    pub fn stop(&self, provider: &dyn TrackingProvider) -> bool {
        let detached = provider.detach(&self.sink);
        if detached {
            tracing::info!("Tracker disarmed");
        }
        detached
    }

    /// Apply a single batch immediately
    pub fn apply(&mut self, batch: &TrackingBatch) -> BatchSummary {
        let summary = self.router.handle_batch(batch);
        self.totals.merge(&summary);
        self.batches_applied += 1;
        summary
    }

    /// Apply every queued batch without waiting; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(batch) = self.batch_rx.try_recv() {
            self.apply(&batch);
            applied += 1;
        }
        applied
    }

    /// Apply batches as they arrive until shutdown is signalled
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                Some(batch) = self.batch_rx.recv() => {
                    let summary = self.apply(&batch);
                    tracing::debug!("Batch {}: {}", self.batches_applied, summary);
                }
                _ = shutdown_rx.recv() => {
                    let drained = self.pump();
                    tracing::info!("Tracker shutting down ({} queued batches drained)", drained);
                    break;
                }
            }
        }
    }

    /// Destroy every live representation
    pub fn teardown(&mut self) -> usize {
        let destroyed = self.router.manager_mut().clear();
        if destroyed > 0 {
            tracing::info!("Destroyed {} remaining representations", destroyed);
        }
        destroyed
    }

    pub fn router(&self) -> &TrackingRouter<S> {
        &self.router
    }

    pub fn manager(&self) -> &EntityLifecycleManager<S> {
        self.router.manager()
    }

    /// Outcome totals across every batch applied so far
    pub fn totals(&self) -> BatchSummary {
        self.totals
    }

    pub fn batches_applied(&self) -> usize {
        self.batches_applied
    }

    pub fn into_router(self) -> TrackingRouter<S> {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PrefabTemplate;
    use crate::scene::MemoryScene;
    use crate::tracking::{ManualProvider, Pose, TrackedObject, TrackingStatus};
    use std::time::Duration;

    fn config() -> Config {
        Config {
            prefabs: vec![PrefabTemplate::new("marker_a", "templateA", false)],
            ..Default::default()
        }
    }

    fn added(name: &str) -> TrackingBatch {
        TrackingBatch::default().with_added(TrackedObject::new(
            name,
            Pose::IDENTITY,
            TrackingStatus::Tracking,
        ))
    }

    fn removed(name: &str) -> TrackingBatch {
        TrackingBatch::default().with_removed(TrackedObject::new(
            name,
            Pose::IDENTITY,
            TrackingStatus::None,
        ))
    }

    #[test]
    fn test_start_pump_stop() {
        let mut service = TrackerService::from_config(&config(), MemoryScene::new());
        let provider = ManualProvider::new();

        // Nothing attached yet: batch is dropped
        assert!(!provider.publish(added("marker_a")));

        service.start(&provider).unwrap();
        assert!(provider.publish(added("marker_a")));
        assert_eq!(service.pump(), 1);
        assert!(service.manager().contains("marker_a"));

        assert!(service.stop(&provider));
        assert!(!provider.publish(removed("marker_a")));
        assert_eq!(service.pump(), 0);
        assert!(service.manager().contains("marker_a"));
        assert_eq!(service.batches_applied(), 1);
    }

    #[test]
    fn test_start_twice_fails() {
        let service = TrackerService::from_config(&config(), MemoryScene::new());
        let provider = ManualProvider::new();
        service.start(&provider).unwrap();
        assert!(service.start(&provider).is_err());
    }

    #[test]
    fn test_refused_service_cannot_stop_owner() {
        let mut owner = TrackerService::from_config(&config(), MemoryScene::new());
        let refused = TrackerService::from_config(&config(), MemoryScene::new());
        let provider = ManualProvider::new();

        owner.start(&provider).unwrap();
        assert!(refused.start(&provider).is_err());
        assert!(!refused.stop(&provider));

        assert!(provider.is_attached());
        assert!(provider.publish(added("marker_a")));
        assert_eq!(owner.pump(), 1);
        assert!(owner.manager().contains("marker_a"));

        assert!(owner.stop(&provider));
        assert!(!provider.is_attached());
    }

    #[test]
    fn test_teardown_destroys_remaining() {
        let mut service = TrackerService::from_config(&config(), MemoryScene::new());
        service.apply(&added("marker_a"));
        assert_eq!(service.teardown(), 1);
        assert!(service.manager().is_empty());
        assert_eq!(service.manager().scene().destroy_count(), 1);
    }

    #[test]
    fn test_demo_session() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
        let config = Config::from_file(dir.join("arspawn.toml")).unwrap();
        config.validate().unwrap();

        let provider =
            crate::tracking::replay::ReplayProvider::from_file(dir.join("session.jsonl")).unwrap();
        let mut service = TrackerService::from_config(&config, MemoryScene::new());
        service.start(&provider).unwrap();
        assert_eq!(provider.play(), 5);
        assert_eq!(service.pump(), 5);

        let manager = service.manager();
        assert!(!manager.contains("marker_a"));
        assert!(!manager.contains("unregistered_poster"));

        // Limited tracking hid the mug in place
        let mug = manager.get("coffee_mug").unwrap();
        assert!(!mug.is_visible());
        assert!(mug
            .pose()
            .position
            .abs_diff_eq(glam::Vec3::new(0.5, 0.0, -0.3), 1e-6));

        let totals = service.totals();
        assert_eq!(totals.spawned, 2);
        assert_eq!(totals.destroyed, 1);
        assert_eq!(totals.ignored, 1);
        assert_eq!(manager.scene().command_count(), 7);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let mut service = TrackerService::from_config(&config(), MemoryScene::new());
        let provider = ManualProvider::new();
        service.start(&provider).unwrap();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        provider.publish(added("marker_a"));
        provider.publish(added("unknown"));
        provider.publish(removed("marker_a"));
        shutdown_tx.send(()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), service.run(shutdown_rx))
            .await
            .unwrap();

        assert_eq!(service.batches_applied(), 3);
        let totals = service.totals();
        assert_eq!(totals.spawned, 1);
        assert_eq!(totals.ignored, 1);
        assert_eq!(totals.destroyed, 1);
        assert!(service.manager().is_empty());
    }
}
