//! Entity lifecycle management
//!
//! Owns the mapping from tracked identity to spawned representation and is
//! the only caller of `Scene::spawn` / `Scene::destroy`.

pub mod instance;

pub use instance::{ActiveInstance, Visibility};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::registry::PrefabRegistry;
use crate::scene::Scene;
use crate::tracking::{Pose, TrackedIdentity};

/// What to do when an identity that already has a representation is added again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the existing representation and ignore the add
    Reject,
    /// Destroy the existing representation and spawn a fresh one
    Replace,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self::Reject
    }
}

/// Result of a single lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A representation was created
    Spawned,
    /// An existing representation was destroyed and recreated
    Replaced,
    /// Pose was updated and the representation shown
    Updated,
    /// The representation was hidden (or was already hidden)
    Hidden,
    /// The representation was destroyed and its entry removed
    Destroyed,
    /// Nothing to do: unknown identity, inactive identity or rejected duplicate
    Ignored,
}

/// Tracked-identity → representation lifecycle manager
#[derive(Debug)]
pub struct EntityLifecycleManager<S: Scene> {
    registry: PrefabRegistry,
    scene: S,
    policy: DuplicatePolicy,
    instances: HashMap<TrackedIdentity, ActiveInstance>,
}

impl<S: Scene> EntityLifecycleManager<S> {
    pub fn new(registry: PrefabRegistry, scene: S) -> Self {
        Self::with_policy(registry, scene, DuplicatePolicy::default())
    }

    pub fn with_policy(registry: PrefabRegistry, scene: S, policy: DuplicatePolicy) -> Self {
        Self {
            registry,
            scene,
            policy,
            instances: HashMap::new(),
        }
    }

    /// Spawn a representation for a newly detected object
    pub fn on_added(&mut self, identity: &TrackedIdentity, pose: Pose) -> Outcome {
        let template = match self.registry.lookup(identity.as_str()) {
            Some(t) => t,
            None => {
                tracing::debug!("No prefab registered for '{}', ignoring", identity);
                return Outcome::Ignored;
            }
        };

        let mut outcome = Outcome::Spawned;
        if let Some(existing) = self.instances.get(identity) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    tracing::debug!(
                        "'{}' already has representation {}, ignoring add",
                        identity,
                        existing.handle()
                    );
                    return Outcome::Ignored;
                }
                DuplicatePolicy::Replace => {
                    tracing::debug!(
                        "'{}' re-added, replacing representation {}",
                        identity,
                        existing.handle()
                    );
                    self.scene.destroy(existing.handle());
                    outcome = Outcome::Replaced;
                }
            }
        }

        let handle = self.scene.spawn(template, pose);
        let instance = ActiveInstance::new(handle, &template.template, pose, template.destroy_on_removal);

        tracing::debug!("Spawned {} for '{}' from {}", handle, identity, template.template);
        self.instances.insert(identity.clone(), instance);
        outcome
    }

    /// Full tracking: follow the pose and show
    pub fn on_tracking(&mut self, identity: &TrackedIdentity, pose: Pose) -> Outcome {
        match self.instances.get_mut(identity) {
            Some(instance) => {
                Self::show_at(&mut self.scene, instance, pose);
                Outcome::Updated
            }
            None => Self::ignore_inactive(identity, "tracking"),
        }
    }

    /// Degraded tracking: follow and show, or hide, per the template policy
    pub fn on_limited(&mut self, identity: &TrackedIdentity, pose: Pose) -> Outcome {
        match self.instances.get_mut(identity) {
            Some(instance) if !instance.destroy_on_removal() => {
                Self::show_at(&mut self.scene, instance, pose);
                Outcome::Updated
            }
            Some(instance) => {
                Self::hide(&mut self.scene, instance);
                Outcome::Hidden
            }
            None => Self::ignore_inactive(identity, "limited"),
        }
    }

    /// Tracking lost: hide in place
    pub fn on_none(&mut self, identity: &TrackedIdentity) -> Outcome {
        match self.instances.get_mut(identity) {
            Some(instance) => {
                Self::hide(&mut self.scene, instance);
                Outcome::Hidden
            }
            None => Self::ignore_inactive(identity, "none"),
        }
    }

    /// Provider dropped the object: destroy its representation
    pub fn on_removed(&mut self, identity: &TrackedIdentity) -> Outcome {
        match self.instances.remove(identity) {
            Some(instance) => {
                tracing::debug!("Destroying {} for '{}'", instance.handle(), identity);
                self.scene.destroy(instance.handle());
                Outcome::Destroyed
            }
            None => Self::ignore_inactive(identity, "removal"),
        }
    }

    /// Destroy every active representation
    pub fn clear(&mut self) -> usize {
        let count = self.instances.len();
        for (identity, instance) in self.instances.drain() {
            tracing::debug!("Clearing {} for '{}'", instance.handle(), identity);
            self.scene.destroy(instance.handle());
        }
        count
    }

    pub fn get(&self, identity: &str) -> Option<&ActiveInstance> {
        self.instances.get(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.instances.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TrackedIdentity, &ActiveInstance)> {
        self.instances.iter()
    }

    pub fn registry(&self) -> &PrefabRegistry {
        &self.registry
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Give back the scene; representations still alive stay in it
    pub fn into_scene(self) -> S {
        self.scene
    }

    fn show_at(scene: &mut S, instance: &mut ActiveInstance, pose: Pose) {
        instance.set_pose(pose);
        scene.set_pose(instance.handle(), pose);
        if instance.set_visibility(Visibility::Visible) {
            scene.set_visible(instance.handle(), true);
        }
    }

    fn hide(scene: &mut S, instance: &mut ActiveInstance) {
        if instance.set_visibility(Visibility::Hidden) {
            scene.set_visible(instance.handle(), false);
        }
    }

    fn ignore_inactive(identity: &TrackedIdentity, event: &str) -> Outcome {
        tracing::debug!("No active representation for '{}' ({}), ignoring", identity, event);
        Outcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PrefabTemplate;
    use crate::scene::{MemoryScene, SceneCommand};
    use glam::{Quat, Vec3};

    fn id(name: &str) -> TrackedIdentity {
        TrackedIdentity::from(name)
    }

    fn at(x: f32) -> Pose {
        Pose::from_position(Vec3::new(x, 0.0, 0.0))
    }

    fn manager(destroy_on_removal: bool) -> EntityLifecycleManager<MemoryScene> {
        let registry = PrefabRegistry::new(vec![PrefabTemplate::new(
            "marker_a",
            "prefabs/a.glb",
            destroy_on_removal,
        )]);
        EntityLifecycleManager::new(registry, MemoryScene::new())
    }

    #[test]
    fn test_unknown_identity_is_ignored() {
        let mut mgr = manager(false);
        assert_eq!(mgr.on_added(&id("unknown"), at(0.0)), Outcome::Ignored);
        assert!(mgr.is_empty());
        assert_eq!(mgr.scene().spawn_count(), 0);
        assert_eq!(mgr.scene().command_count(), 0);
    }

    #[test]
    fn test_add_then_remove() {
        let mut mgr = manager(false);
        assert_eq!(mgr.on_added(&id("marker_a"), at(0.0)), Outcome::Spawned);
        assert!(mgr.contains("marker_a"));

        assert_eq!(mgr.on_removed(&id("marker_a")), Outcome::Destroyed);
        assert!(!mgr.contains("marker_a"));
        assert_eq!(mgr.scene().spawn_count(), 1);
        assert_eq!(mgr.scene().destroy_count(), 1);
        assert_eq!(mgr.scene().node_count(), 0);
    }

    #[test]
    fn test_updates_for_inactive_identity_are_ignored() {
        let mut mgr = manager(false);
        assert_eq!(mgr.on_tracking(&id("marker_a"), at(1.0)), Outcome::Ignored);
        assert_eq!(mgr.on_limited(&id("marker_a"), at(1.0)), Outcome::Ignored);
        assert_eq!(mgr.on_none(&id("marker_a")), Outcome::Ignored);
        assert_eq!(mgr.on_removed(&id("marker_a")), Outcome::Ignored);
        assert_eq!(mgr.scene().command_count(), 0);
    }

    #[test]
    fn test_repeated_none_hides_once() {
        let mut mgr = manager(false);
        mgr.on_added(&id("marker_a"), at(0.0));

        mgr.on_none(&id("marker_a"));
        mgr.on_none(&id("marker_a"));
        mgr.on_none(&id("marker_a"));

        assert_eq!(mgr.scene().visibility_change_count(), 1);
        assert_eq!(mgr.get("marker_a").unwrap().visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_limited_follows_pose_when_not_destroy_on_removal() {
        let mut mgr = manager(false);
        mgr.on_added(&id("marker_a"), at(1.0));

        assert_eq!(mgr.on_limited(&id("marker_a"), at(2.0)), Outcome::Updated);

        let instance = mgr.get("marker_a").unwrap();
        assert!(instance.is_visible());
        assert_eq!(instance.pose(), at(2.0));
    }

    #[test]
    fn test_limited_hides_when_destroy_on_removal() {
        let mut mgr = manager(true);
        mgr.on_added(&id("marker_a"), at(1.0));

        assert_eq!(mgr.on_limited(&id("marker_a"), at(2.0)), Outcome::Hidden);

        let instance = mgr.get("marker_a").unwrap();
        assert!(!instance.is_visible());
        assert_eq!(instance.pose(), at(1.0));

        let handle = instance.handle();
        assert_eq!(mgr.scene().node(handle).unwrap().pose, at(1.0));
    }

    #[test]
    fn test_tracking_reshows_hidden_instance() {
        let mut mgr = manager(false);
        mgr.on_added(&id("marker_a"), at(0.0));
        mgr.on_none(&id("marker_a"));

        let pose = Pose::new(Vec3::Y, Quat::from_rotation_y(0.5));
        assert_eq!(mgr.on_tracking(&id("marker_a"), pose), Outcome::Updated);

        let instance = mgr.get("marker_a").unwrap();
        assert!(instance.is_visible());
        assert_eq!(instance.pose(), pose);

        let node = mgr.scene().node(instance.handle()).unwrap();
        assert!(node.visible);
        assert_eq!(node.pose, pose);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut mgr = manager(false);
        mgr.on_added(&id("marker_a"), at(0.0));
        let first = mgr.get("marker_a").unwrap().handle();

        assert_eq!(mgr.on_added(&id("marker_a"), at(5.0)), Outcome::Ignored);
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.get("marker_a").unwrap().handle(), first);
        assert_eq!(mgr.get("marker_a").unwrap().pose(), at(0.0));
        assert_eq!(mgr.scene().spawn_count(), 1);
    }

    #[test]
    fn test_duplicate_add_replaced() {
        let registry = PrefabRegistry::new(vec![PrefabTemplate::new("marker_a", "a.glb", false)]);
        let mut mgr = EntityLifecycleManager::with_policy(
            registry,
            MemoryScene::with_journal(),
            DuplicatePolicy::Replace,
        );

        mgr.on_added(&id("marker_a"), at(0.0));
        let first = mgr.get("marker_a").unwrap().handle();

        assert_eq!(mgr.on_added(&id("marker_a"), at(5.0)), Outcome::Replaced);
        let second = mgr.get("marker_a").unwrap().handle();

        assert_ne!(first, second);
        assert_eq!(mgr.len(), 1);
        assert_eq!(mgr.scene().node_count(), 1);
        assert_eq!(mgr.scene().spawn_count(), 2);
        assert_eq!(mgr.scene().destroy_count(), 1);
        assert_eq!(
            mgr.scene().journal()[1],
            SceneCommand::Destroy { handle: first }
        );
    }

    #[test]
    fn test_clear_destroys_everything() {
        let registry = PrefabRegistry::new(vec![
            PrefabTemplate::new("marker_a", "a.glb", false),
            PrefabTemplate::new("marker_b", "b.glb", true),
        ]);
        let mut mgr = EntityLifecycleManager::new(registry, MemoryScene::new());
        mgr.on_added(&id("marker_a"), at(0.0));
        mgr.on_added(&id("marker_b"), at(1.0));

        assert_eq!(mgr.clear(), 2);
        assert!(mgr.is_empty());
        assert_eq!(mgr.scene().node_count(), 0);
        assert_eq!(mgr.scene().destroy_count(), 2);
    }
}
