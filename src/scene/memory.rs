//! In-memory scene graph
//!
//! Keeps a node table and per-command counters. A full command journal is
//! recorded only when requested with [`MemoryScene::with_journal`], so a
//! long-running listener holds memory proportional to its live nodes.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{RepresentationHandle, Scene};
use crate::registry::PrefabTemplate;
use crate::tracking::Pose;

/// A live representation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub template: String,
    pub pose: Pose,
    pub visible: bool,
}

/// A scene operation as received from the lifecycle manager
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SceneCommand {
    Spawn {
        handle: RepresentationHandle,
        template: String,
        pose: Pose,
    },
    SetPose {
        handle: RepresentationHandle,
        pose: Pose,
    },
    SetVisible {
        handle: RepresentationHandle,
        visible: bool,
    },
    Destroy {
        handle: RepresentationHandle,
    },
}

/// Number of commands received, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandCounts {
    pub spawns: usize,
    pub poses: usize,
    pub visibility_changes: usize,
    pub destroys: usize,
}

impl CommandCounts {
    pub fn total(&self) -> usize {
        self.spawns + self.poses + self.visibility_changes + self.destroys
    }
}

/// Scene graph held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryScene {
    next_handle: u64,
    nodes: BTreeMap<RepresentationHandle, SceneNode>,
    counts: CommandCounts,
    journal: Option<Vec<SceneCommand>>,
}

impl MemoryScene {
    /// Scene without a command journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene that also records every command in order
    pub fn with_journal() -> Self {
        Self {
            journal: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn is_journaling(&self) -> bool {
        self.journal.is_some()
    }

    pub fn node(&self, handle: RepresentationHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    /// Live nodes ordered by handle
    pub fn nodes(&self) -> impl Iterator<Item = (RepresentationHandle, &SceneNode)> {
        self.nodes.iter().map(|(h, n)| (*h, n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every command received, in order; empty unless journaling
    pub fn journal(&self) -> &[SceneCommand] {
        self.journal.as_deref().unwrap_or(&[])
    }

    pub fn counts(&self) -> CommandCounts {
        self.counts
    }

    /// Total commands received, journaled or not
    pub fn command_count(&self) -> usize {
        self.counts.total()
    }

    pub fn spawn_count(&self) -> usize {
        self.counts.spawns
    }

    pub fn destroy_count(&self) -> usize {
        self.counts.destroys
    }

    pub fn visibility_change_count(&self) -> usize {
        self.counts.visibility_changes
    }

    fn record(&mut self, command: SceneCommand) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(command);
        }
    }
}

impl Scene for MemoryScene {
    fn spawn(&mut self, template: &PrefabTemplate, pose: Pose) -> RepresentationHandle {
        self.next_handle += 1;
        let handle = RepresentationHandle(self.next_handle);

        tracing::debug!("scene: spawn {} from {} at {:?}", handle, template.template, pose.position);

        self.nodes.insert(
            handle,
            SceneNode {
                template: template.template.clone(),
                pose,
                visible: true,
            },
        );
        self.counts.spawns += 1;
        self.record(SceneCommand::Spawn {
            handle,
            template: template.template.clone(),
            pose,
        });
        handle
    }

    fn set_pose(&mut self, handle: RepresentationHandle, pose: Pose) {
        match self.nodes.get_mut(&handle) {
            Some(node) => node.pose = pose,
            None => tracing::warn!("scene: set_pose on unknown handle {}", handle),
        }
        self.counts.poses += 1;
        self.record(SceneCommand::SetPose { handle, pose });
    }

    fn set_visible(&mut self, handle: RepresentationHandle, visible: bool) {
        tracing::debug!("scene: {} visible={}", handle, visible);
        match self.nodes.get_mut(&handle) {
            Some(node) => node.visible = visible,
            None => tracing::warn!("scene: set_visible on unknown handle {}", handle),
        }
        self.counts.visibility_changes += 1;
        self.record(SceneCommand::SetVisible { handle, visible });
    }

    fn destroy(&mut self, handle: RepresentationHandle) {
        tracing::debug!("scene: destroy {}", handle);
        if self.nodes.remove(&handle).is_none() {
            tracing::warn!("scene: destroy on unknown handle {}", handle);
        }
        self.counts.destroys += 1;
        self.record(SceneCommand::Destroy { handle });
    }
}
