//! `arspawn.toml` loading
//!
//! The file has three parts, all optional:
//!
//! ```toml
//! [tracker]
//! duplicate_policy = "reject"   # or "replace"
//!
//! [udp]
//! listen_address = "0.0.0.0"
//! port = 39570
//!
//! [[prefabs]]
//! name = "marker_a"             # tracked identity
//! template = "prefabs/marker_a.glb"
//! destroy_on_removal = false
//! ```
//!
//! `[[prefabs]]` is searched top to bottom; a repeated name is shadowed by
//! its first entry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ArspawnError, ConfigError};
use crate::lifecycle::DuplicatePolicy;
use crate::registry::{PrefabRegistry, PrefabTemplate};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub udp: UdpConfig,
    /// Prefab table, in lookup order
    pub prefabs: Vec<PrefabTemplate>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArspawnError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, ArspawnError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from the first of [`search_paths`] that exists
    pub fn load() -> Result<Self, ArspawnError> {
        Self::load_from(&search_paths())
    }

    /// Load the first existing file in `paths`, or defaults if none exists
    pub fn load_from(paths: &[PathBuf]) -> Result<Self, ArspawnError> {
        match paths.iter().find(|path| path.is_file()) {
            Some(path) => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(path)
            }
            None => {
                tracing::info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ArspawnError> {
        for (i, prefab) in self.prefabs.iter().enumerate() {
            if prefab.name.as_str().trim().is_empty() {
                return Err(ConfigError::MissingField(format!("prefabs[{}].name", i)).into());
            }
            if prefab.template.trim().is_empty() {
                return Err(ConfigError::MissingField(format!("prefabs[{}].template", i)).into());
            }
        }

        if self.udp.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "udp.port".to_string(),
                message: "Port must be greater than 0".to_string(),
            }
            .into());
        }

        if self.prefabs.is_empty() {
            tracing::warn!("No prefabs configured; every tracked object will be ignored");
        }

        for name in self.registry().duplicate_names() {
            tracing::warn!(
                "Prefab '{}' is configured more than once; only the first entry is used",
                name
            );
        }

        Ok(())
    }

    /// Build the prefab registry from the configured table
    pub fn registry(&self) -> PrefabRegistry {
        PrefabRegistry::new(self.prefabs.clone())
    }
}

/// Lifecycle behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Policy for an add of an identity that is already active:
    /// "reject" or "replace"
    pub duplicate_policy: DuplicatePolicy,
}

/// JSON-over-UDP provider configuration (used by `arspawn listen`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpConfig {
    /// Listen address
    pub listen_address: String,
    /// Listen port
    pub port: u16,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            port: 39570,
        }
    }
}

/// Config file locations in lookup order: working directory, `config/`,
/// then the per-user config directory
pub fn search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("arspawn.toml"),
        PathBuf::from("config/arspawn.toml"),
        user_config_dir().join("arspawn.toml"),
    ]
}

/// Per-user config directory for this platform
fn user_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("arspawn");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/arspawn");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/arspawn");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("arspawn");
        }
    }

    PathBuf::from(".")
}
