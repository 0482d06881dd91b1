//! arspawn - Tracked-object prefab lifecycle manager
//!
//! Binds object-tracking events to scene representations:
//! - Spawns a configured prefab when a reference object is first detected
//! - Moves, shows and hides it as tracking quality changes
//! - Destroys it when the tracking provider drops the object
//!
//! Tracking itself and rendering stay with the host behind the
//! [`TrackingProvider`](tracking::TrackingProvider) and [`Scene`](scene::Scene)
//! traits.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod scene;
pub mod service;
pub mod tracking;

pub use config::Config;
pub use error::{ArspawnError, Result};
pub use lifecycle::{DuplicatePolicy, EntityLifecycleManager, Outcome};
pub use registry::{PrefabRegistry, PrefabTemplate};
pub use service::TrackerService;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
