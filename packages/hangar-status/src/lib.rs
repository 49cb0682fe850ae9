pub mod detector;
pub mod error;
pub mod inspector;
pub mod install_status;
pub mod manager;
pub mod observer;
pub mod state;
pub mod status_tracker;
pub mod track_selector;

pub use detector::{detect_status, Detection, DetectionContext, DetectionRule};
pub use error::{ManagerError, ManagerResult};
pub use inspector::{
    FsInstallInspector, InspectError, InstallInspector, InstallManifest, UpdateCheckOptions,
    UpdateInfo,
};
pub use install_status::InstallStatus;
pub use manager::{AddonManager, ResolutionOutcome};
pub use observer::{AddonObserver, ObserverManager};
pub use state::{PersistedSnapshot, PersistedState};
pub use status_tracker::{AddonStatusInfo, StatusTracker};
pub use track_selector::{TrackSelection, TrackSelector};
