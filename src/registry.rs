//! Prefab registry
//!
//! Static table mapping reference-object names to representation templates.
//! Loaded once from configuration and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tracking::TrackedIdentity;

/// A representation template bound to a reference-object name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabTemplate {
    /// Reference object name reported by the tracking provider
    pub name: TrackedIdentity,
    /// Asset descriptor handed to the scene when spawning
    pub template: String,
    /// Hide the representation as soon as tracking degrades, instead of
    /// continuing to follow the limited pose
    #[serde(default)]
    pub destroy_on_removal: bool,
}

impl PrefabTemplate {
    pub fn new(
        name: impl Into<TrackedIdentity>,
        template: impl Into<String>,
        destroy_on_removal: bool,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            destroy_on_removal,
        }
    }
}

/// Ordered prefab table with first-match-wins lookup
#[derive(Debug, Clone, Default)]
pub struct PrefabRegistry {
    entries: Vec<PrefabTemplate>,
    index: HashMap<TrackedIdentity, usize>,
}

impl PrefabRegistry {
    pub fn new(entries: Vec<PrefabTemplate>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            // Keep the first index for duplicate names
            index.entry(entry.name.clone()).or_insert(i);
        }
        Self { entries, index }
    }

    /// First template registered under `name`
    pub fn lookup(&self, name: &str) -> Option<&PrefabTemplate> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in configuration order, duplicates included
    pub fn iter(&self) -> impl Iterator<Item = &PrefabTemplate> {
        self.entries.iter()
    }

    /// Names that appear more than once; only the first entry is reachable
    pub fn duplicate_names(&self) -> Vec<&TrackedIdentity> {
        let mut counts: HashMap<&TrackedIdentity, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(&entry.name).or_default() += 1;
        }

        let mut dupes: Vec<&TrackedIdentity> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
        dupes.sort();
        dupes
    }
}

impl FromIterator<PrefabTemplate> for PrefabRegistry {
    fn from_iter<I: IntoIterator<Item = PrefabTemplate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = PrefabRegistry::new(vec![
            PrefabTemplate::new("marker_a", "prefabs/a.glb", false),
            PrefabTemplate::new("marker_b", "prefabs/b.glb", true),
        ]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("marker_a").unwrap().template, "prefabs/a.glb");
        assert!(registry.lookup("marker_b").unwrap().destroy_on_removal);
        assert!(registry.lookup("marker_c").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let registry = PrefabRegistry::new(vec![
            PrefabTemplate::new("marker_a", "first.glb", false),
            PrefabTemplate::new("marker_b", "other.glb", false),
            PrefabTemplate::new("marker_a", "second.glb", true),
        ]);

        let found = registry.lookup("marker_a").unwrap();
        assert_eq!(found.template, "first.glb");
        assert!(!found.destroy_on_removal);

        let dupes = registry.duplicate_names();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].as_str(), "marker_a");
        assert_eq!(registry.iter().count(), 3);
    }

    #[test]
    fn test_empty_registry() {
        let registry = PrefabRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.lookup("anything").is_none());
        assert!(registry.duplicate_names().is_empty());
    }
}
