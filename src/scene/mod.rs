//! Scene module
//!
//! Outbound seam to the host scene graph. The lifecycle manager only ever
//! talks to representations through this trait.

pub mod memory;

pub use memory::{CommandCounts, MemoryScene, SceneCommand, SceneNode};

use serde::{Deserialize, Serialize};

use crate::registry::PrefabTemplate;
use crate::tracking::Pose;

/// Opaque handle to a spawned representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepresentationHandle(pub u64);

impl std::fmt::Display for RepresentationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host scene operations needed to manage representations
pub trait Scene {
    /// Instantiate `template` at `pose`; the new representation starts visible
    fn spawn(&mut self, template: &PrefabTemplate, pose: Pose) -> RepresentationHandle;

    fn set_pose(&mut self, handle: RepresentationHandle, pose: Pose);

    fn set_visible(&mut self, handle: RepresentationHandle, visible: bool);

    fn destroy(&mut self, handle: RepresentationHandle);
}

impl<S: Scene + ?Sized> Scene for Box<S> {
    fn spawn(&mut self, template: &PrefabTemplate, pose: Pose) -> RepresentationHandle {
        (**self).spawn(template, pose)
    }

    fn set_pose(&mut self, handle: RepresentationHandle, pose: Pose) {
        (**self).set_pose(handle, pose)
    }

    fn set_visible(&mut self, handle: RepresentationHandle, visible: bool) {
        (**self).set_visible(handle, visible)
    }

    fn destroy(&mut self, handle: RepresentationHandle) {
        (**self).destroy(handle)
    }
}
