//! Tracking module
//!
//! Inbound side of the tracker:
//! - Wire types for provider batches (identity, pose, tracking status)
//! - The event router that dispatches batches to the lifecycle manager
//! - Tracking providers (manual, JSON-lines replay, JSON over UDP)

pub mod provider;
pub mod replay;
pub mod router;
pub mod udp;

pub use provider::{BatchSink, ManualProvider, TrackingProvider};
pub use router::{BatchSummary, TrackingRouter};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Name of a real-world reference object (marker, scanned object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedIdentity(String);

impl TrackedIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackedIdentity {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TrackedIdentity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for TrackedIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// World-space position and rotation of a tracked object or representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position (x, y, z)
    pub position: Vec3,
    /// Rotation quaternion (x, y, z, w)
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Provider confidence in an object's current pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    /// Pose is fully tracked
    Tracking,
    /// Pose is degraded (e.g. object partially occluded)
    Limited,
    /// Object is not currently tracked
    None,
}

impl std::fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingStatus::Tracking => write!(f, "tracking"),
            TrackingStatus::Limited => write!(f, "limited"),
            TrackingStatus::None => write!(f, "none"),
        }
    }
}

/// A single tracked-object record as delivered by a provider
///
/// Every field is required: a record without a pose or status is rejected
/// at parse time instead of being read as a full-confidence pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Reference object name
    pub name: TrackedIdentity,
    /// Current position (x, y, z)
    pub position: Vec3,
    /// Current rotation quaternion (x, y, z, w)
    pub rotation: Quat,
    /// Tracking status
    pub status: TrackingStatus,
}

impl TrackedObject {
    pub fn new(name: impl Into<TrackedIdentity>, pose: Pose, status: TrackingStatus) -> Self {
        Self {
            name: name.into(),
            position: pose.position,
            rotation: pose.rotation,
            status,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

/// One provider notification: objects added, updated and removed this frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingBatch {
    pub added: Vec<TrackedObject>,
    pub updated: Vec<TrackedObject>,
    pub removed: Vec<TrackedObject>,
}

impl TrackingBatch {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Total number of records across all three lists
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }

    pub fn with_added(mut self, object: TrackedObject) -> Self {
        self.added.push(object);
        self
    }

    pub fn with_updated(mut self, object: TrackedObject) -> Self {
        self.updated.push(object);
        self
    }

    pub fn with_removed(mut self, object: TrackedObject) -> Self {
        self.removed.push(object);
        self
    }
}
