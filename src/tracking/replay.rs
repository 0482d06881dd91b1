//! JSON-lines replay provider
//!
//! Plays back a recorded tracking session: one `TrackingBatch` JSON object per
//! line. Blank lines and lines starting with `#` are skipped.

use std::path::Path;

use crate::error::ProviderError;

use super::provider::{BatchSink, ListenerSlot, TrackingProvider};
use super::TrackingBatch;

/// Provider backed by a pre-recorded list of batches
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    batches: Vec<TrackingBatch>,
    slot: ListenerSlot,
}

impl ReplayProvider {
    pub fn new(batches: Vec<TrackingBatch>) -> Self {
        Self {
            batches,
            slot: ListenerSlot::new(),
        }
    }

    /// Load a session from a JSON-lines file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ProviderError::ReplayRead(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let provider = Self::from_str(&contents)?;
        tracing::info!(
            "Loaded {} batches from {}",
            provider.batches.len(),
            path.as_ref().display()
        );
        Ok(provider)
    }

    /// Parse a session from JSON-lines text
    pub fn from_str(s: &str) -> Result<Self, ProviderError> {
        let mut batches = Vec::new();

        for (i, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let batch: TrackingBatch =
                serde_json::from_str(line).map_err(|e| ProviderError::ReplayParse {
                    line: i + 1,
                    message: e.to_string(),
                })?;
            batches.push(batch);
        }

        Ok(Self::new(batches))
    }

    pub fn batches(&self) -> &[TrackingBatch] {
        &self.batches
    }

    /// Publish every batch in order; returns how many were delivered
    pub fn play(&self) -> usize {
        self.batches
            .iter()
            .take_while(|batch| self.slot.publish((*batch).clone()))
            .count()
    }
}

impl TrackingProvider for ReplayProvider {
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
