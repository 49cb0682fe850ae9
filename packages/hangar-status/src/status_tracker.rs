use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use hangar_provider::ReleaseInfo;
use hangar_utils::get_now_unix;

use crate::install_status::InstallStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonStatusInfo {
    pub addon_key: String,
    pub status: InstallStatus,
    pub selected_track: Option<String>,
    pub installed_track: Option<String>,
    pub latest_version: Option<ReleaseInfo>,
    pub last_checked: Option<u64>,
}

impl AddonStatusInfo {
    fn new(addon_key: &str) -> Self {
        Self {
            addon_key: addon_key.to_string(),
            status: InstallStatus::Unknown,
            selected_track: None,
            installed_track: None,
            latest_version: None,
            last_checked: None,
        }
    }
}

/// In-process view of the last resolution of every add-on.
#[derive(Clone, Default)]
pub struct StatusTracker {
    statuses: Arc<Mutex<HashMap<String, AddonStatusInfo>>>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update_status(
        &self,
        addon_key: &str,
        status: InstallStatus,
        selected_track: Option<String>,
        installed_track: Option<String>,
    ) {
        let mut statuses = self.statuses.lock().await;
        let info = statuses
            .entry(addon_key.to_string())
            .or_insert_with(|| AddonStatusInfo::new(addon_key));
        info.status = status;
        info.selected_track = selected_track;
        info.installed_track = installed_track;
        info.last_checked = Some(get_now_unix());
    }

    pub async fn set_selected_track(&self, addon_key: &str, track_url: &str) {
        let mut statuses = self.statuses.lock().await;
        let info = statuses
            .entry(addon_key.to_string())
            .or_insert_with(|| AddonStatusInfo::new(addon_key));
        if info.selected_track.as_deref() != Some(track_url) {
            info.selected_track = Some(track_url.to_string());
            // the cached latest version belonged to the previous track
            info.latest_version = None;
        }
    }

    pub async fn set_latest_version(&self, addon_key: &str, latest: ReleaseInfo) {
        let mut statuses = self.statuses.lock().await;
        statuses
            .entry(addon_key.to_string())
            .or_insert_with(|| AddonStatusInfo::new(addon_key))
            .latest_version = Some(latest);
    }

    pub async fn get_status(&self, addon_key: &str) -> Option<AddonStatusInfo> {
        let statuses = self.statuses.lock().await;
        statuses.get(addon_key).cloned()
    }

    pub async fn get_all_statuses(&self) -> Vec<AddonStatusInfo> {
        let statuses = self.statuses.lock().await;
        let mut all: Vec<AddonStatusInfo> = statuses.values().cloned().collect();
        all.sort_by(|a, b| a.addon_key.cmp(&b.addon_key));
        all
    }
}
