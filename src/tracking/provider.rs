//! Tracking provider seam
//!
//! A provider delivers batches to at most one attached listener. The listener
//! is the sending half of the tracker service's batch channel.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::error::ProviderError;

use super::TrackingBatch;

/// Sending half of a tracker's batch channel
pub type BatchSink = mpsc::UnboundedSender<TrackingBatch>;

/// Source of tracking batches
pub trait TrackingProvider {
    /// Attach `sink` as the sole listener
    fn attach(&self, sink: BatchSink) -> Result<(), ProviderError>;

    /// Detach `sink` if it is the current listener
    ///
    /// Returns true only when `sink` was attached and still live. Another
    /// caller's listener is left in place.
    fn detach(&self, sink: &BatchSink) -> bool;

    fn is_attached(&self) -> bool;
}

/// Shared single-listener slot used by the provider implementations
#[derive(Debug, Clone, Default)]
pub struct ListenerSlot {
    inner: Arc<Mutex<Option<BatchSink>>>,
}

impl ListenerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<BatchSink>> {
        // A panic while holding the lock cannot leave the Option half-written
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn attach(&self, sink: BatchSink) -> Result<(), ProviderError> {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(existing) if !existing.is_closed() => Err(ProviderError::ListenerAlreadyAttached),
            _ => {
                *slot = Some(sink);
                Ok(())
            }
        }
    }

    pub fn detach(&self, sink: &BatchSink) -> bool {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(existing) if existing.same_channel(sink) => {
                let live = !existing.is_closed();
                *slot = None;
                live
            }
            _ => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.lock().as_ref().map(|s| !s.is_closed()).unwrap_or(false)
    }

    /// Forward a batch to the listener; returns false if nobody received it
    pub fn publish(&self, batch: TrackingBatch) -> bool {
        let mut slot = self.lock();
        let sink = match slot.as_ref() {
            Some(sink) => sink,
            None => {
                tracing::debug!("No listener attached, dropping batch of {} records", batch.len());
                return false;
            }
        };

        if sink.send(batch).is_err() {
            tracing::warn!("Listener channel closed, detaching");
            *slot = None;
            return false;
        }
        true
    }
}

/// Host-driven provider: the embedding application pushes batches itself
#[derive(Debug, Clone, Default)]
pub struct ManualProvider {
    slot: ListenerSlot,
}

impl ManualProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a batch to the attached listener
    pub fn publish(&self, batch: TrackingBatch) -> bool {
        self.slot.publish(batch)
    }
}

impl TrackingProvider for ManualProvider {
    fn attach(&self, sink: BatchSink) -> Result<(), ProviderError> {
        self.slot.attach(sink)
    }

    fn detach(&self, sink: &BatchSink) -> bool {
        self.slot.detach(sink)
    }

    fn is_attached(&self) -> bool {
        self.slot.is_attached()
    }
}
