//! Active instance state machine

use serde::{Deserialize, Serialize};

use crate::scene::RepresentationHandle;
use crate::tracking::Pose;

/// Visibility of a spawned representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Visible
    }
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Visible => write!(f, "visible"),
            Visibility::Hidden => write!(f, "hidden"),
        }
    }
}

/// A spawned representation owned by the lifecycle manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveInstance {
    /// Scene handle of the representation
    handle: RepresentationHandle,
    /// Template the representation was spawned from
    template: String,
    /// Last pose pushed to the scene
    pose: Pose,
    /// Current visibility
    visibility: Visibility,
    /// Degraded-tracking policy copied from the template
    destroy_on_removal: bool,
}

impl ActiveInstance {
    /// A freshly spawned, visible instance
    pub fn new(
        handle: RepresentationHandle,
        template: impl Into<String>,
        pose: Pose,
        destroy_on_removal: bool,
    ) -> Self {
        Self {
            handle,
            template: template.into(),
            pose,
            visibility: Visibility::Visible,
            destroy_on_removal,
        }
    }

    pub fn handle(&self) -> RepresentationHandle {
        self.handle
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub fn destroy_on_removal(&self) -> bool {
        self.destroy_on_removal
    }

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Set visibility, returning true if it changed
    pub(crate) fn set_visibility(&mut self, visibility: Visibility) -> bool {
        if self.visibility == visibility {
            return false;
        }
        self.visibility = visibility;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_new_instance_is_visible() {
        let instance = ActiveInstance::new(RepresentationHandle(1), "a.glb", Pose::IDENTITY, false);
        assert!(instance.is_visible());
        assert_eq!(instance.template(), "a.glb");
        assert!(!instance.destroy_on_removal());
    }

    #[test]
    fn test_visibility_transitions() {
        let mut instance = ActiveInstance::new(RepresentationHandle(1), "a.glb", Pose::IDENTITY, true);

        // Visible -> Hidden
        assert!(instance.set_visibility(Visibility::Hidden));
        assert_eq!(instance.visibility(), Visibility::Hidden);

        // Hidden -> Hidden is not a change
        assert!(!instance.set_visibility(Visibility::Hidden));

        // Hidden -> Visible
        assert!(instance.set_visibility(Visibility::from(true)));
        assert!(instance.is_visible());
    }

    #[test]
    fn test_pose_update() {
        let mut instance = ActiveInstance::new(RepresentationHandle(1), "a.glb", Pose::IDENTITY, false);
        let pose = Pose::from_position(Vec3::new(1.0, 0.0, -2.0));
        instance.set_pose(pose);
        assert_eq!(instance.pose(), pose);
    }
}
