//! Hangar - track, latest version and install status resolution for
//! simulator add-ons.
//!
//! The workspace crates are re-exported here so applications can depend on a
//! single crate.

pub use hangar_config as config;
pub use hangar_core as core;
pub use hangar_provider as provider;
pub use hangar_status as status;
pub use hangar_store as store;

// Re-export commonly used types for convenience
pub use hangar_config::{Addon, AddonTrack, Catalog, HangarConfig, ReleaseModel};
pub use hangar_core::{Core, CoreError};
pub use hangar_provider::{ReleaseInfo, ReleaseResolver};
pub use hangar_status::{AddonManager, InstallStatus, ResolutionOutcome};
pub use hangar_store::SettingsStore;
