use futures::future::join_all;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use hangar_config::{Addon, AddonTrack, Catalog};
use hangar_provider::{ReleaseInfo, ReleaseResolver};
use hangar_store::SettingsStore;

use crate::detector::{detect_status, DetectionContext, DetectionRule};
use crate::error::{ManagerError, ManagerResult};
use crate::inspector::InstallInspector;
use crate::install_status::InstallStatus;
use crate::observer::ObserverManager;
use crate::state::PersistedState;
use crate::status_tracker::StatusTracker;
use crate::track_selector::{TrackSelection, TrackSelector};

/// Result of one resolution pass for one add-on.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    pub addon_key: String,
    pub status: InstallStatus,
    pub rule: DetectionRule,
    /// Whether `status` was persisted. An already persisted status other than
    /// `Hidden` is left untouched.
    pub status_written: bool,
    pub selection: TrackSelection,
}

/// Runs resolution passes over a catalog and handles user track actions.
pub struct AddonManager {
    catalog: Arc<Catalog>,
    community_dir: PathBuf,
    resolver: ReleaseResolver,
    state: PersistedState,
    inspector: Arc<dyn InstallInspector>,
    tracker: StatusTracker,
    observers: ObserverManager,
    pass_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AddonManager {
    pub fn new(
        catalog: Catalog,
        community_dir: impl Into<PathBuf>,
        store: SettingsStore,
        inspector: Arc<dyn InstallInspector>,
        resolver: ReleaseResolver,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            community_dir: community_dir.into(),
            resolver,
            state: PersistedState::new(store),
            inspector,
            tracker: StatusTracker::new(),
            observers: ObserverManager::new(),
            pass_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn observers(&self) -> &ObserverManager {
        &self.observers
    }

    pub fn install_dir(&self, addon: &Addon) -> PathBuf {
        self.community_dir.join(&addon.target_directory)
    }

    fn addon(&self, addon_key: &str) -> ManagerResult<&Addon> {
        self.catalog
            .get(addon_key)
            .ok_or_else(|| ManagerError::UnknownAddon(addon_key.to_string()))
    }

    async fn pass_lock(&self, addon_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.pass_locks.lock().await;
        locks.entry(addon_key.to_string()).or_default().clone()
    }

    /// Runs the Track Selector and then the install status rules for `addon`.
    ///
    /// Passes for the same add-on are serialized. Failures never escape: they
    /// are logged and degrade the status to `Unknown`.
    pub async fn configure_initial_state(&self, addon: &Addon) -> ResolutionOutcome {
        let lock = self.pass_lock(&addon.key).await;
        let _guard = lock.lock().await;

        let install_dir = self.install_dir(addon);
        let persisted = self.state.snapshot(addon).await;

        let selection = TrackSelector::new(&self.state, self.inspector.as_ref())
            .select_tracks(addon, &install_dir, &persisted)
            .await;

        let detection = detect_status(&DetectionContext {
            addon,
            selected_track: selection.selected.as_ref(),
            discovered: persisted.discovered,
            install_dir: &install_dir,
            inspector: self.inspector.as_ref(),
        })
        .await;

        let status_written = match self
            .state
            .record_install_status(addon, detection.status)
            .await
        {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(addon = %addon.key, error = %e, "failed to persist install status");
                false
            }
        };

        tracing::info!(
            addon = %addon.key,
            status = %detection.status,
            rule = ?detection.rule,
            track = ?selection.selected.as_ref().map(|track| &track.url),
            "resolution pass finished"
        );

        self.publish(addon, &selection, detection.status).await;

        ResolutionOutcome {
            addon_key: addon.key.clone(),
            status: detection.status,
            rule: detection.rule,
            status_written,
            selection,
        }
    }

    async fn publish(&self, addon: &Addon, selection: &TrackSelection, status: InstallStatus) {
        let selected = selection.selected.as_ref().map(|track| track.url.clone());
        let installed = selection.installed.as_ref().map(|track| track.url.clone());
        self.tracker
            .update_status(&addon.key, status, selected, installed)
            .await;
        self.observers.notify_status_resolved(&addon.key, status).await;
    }

    pub async fn configure_addon(&self, addon_key: &str) -> ManagerResult<ResolutionOutcome> {
        let addon = self.addon(addon_key)?;
        Ok(self.configure_initial_state(addon).await)
    }

    /// One pass per add-on, run concurrently. Outcomes keep catalog order.
    pub async fn configure_all(&self) -> Vec<ResolutionOutcome> {
        let passes = self
            .catalog
            .addons
            .iter()
            .map(|addon| self.configure_initial_state(addon));
        join_all(passes).await
    }

    /// Drops every persisted install status so the next passes start fresh.
    pub async fn reset_install_statuses(&self) -> ManagerResult<()> {
        for addon in &self.catalog.addons {
            self.state.clear_install_status(addon).await?;
        }
        Ok(())
    }

    /// Latest version on `track_url`, or on the selected track when omitted.
    pub async fn latest_version(
        &self,
        addon_key: &str,
        track_url: Option<&str>,
    ) -> ManagerResult<ReleaseInfo> {
        let addon = self.addon(addon_key)?;
        let track = match track_url {
            Some(url) => Self::find_track(addon, url)?.clone(),
            None => self.current_track(addon).await?,
        };

        let release = self.resolver.latest_version_for_track(addon, &track).await?;

        self.tracker
            .set_latest_version(&addon.key, release.clone())
            .await;
        self.observers
            .notify_latest_version(&addon.key, &release)
            .await;
        Ok(release)
    }

    async fn current_track(&self, addon: &Addon) -> ManagerResult<AddonTrack> {
        let persisted = self.state.snapshot(addon).await;
        persisted
            .selected_track
            .or_else(|| addon.default_track().cloned())
            .ok_or_else(|| ManagerError::NoTrack(addon.key.clone()))
    }

    fn find_track<'a>(addon: &'a Addon, url: &str) -> ManagerResult<&'a AddonTrack> {
        addon
            .track_for_source(url)
            .ok_or_else(|| ManagerError::UnknownTrack {
                addon: addon.key.clone(),
                url: url.to_string(),
            })
    }

    /// Explicit user switch. Unlike a resolution pass this overwrites the
    /// persisted selection.
    pub async fn select_track(&self, addon_key: &str, track_url: &str) -> ManagerResult<AddonTrack> {
        let addon = self.addon(addon_key)?;
        let track = Self::find_track(addon, track_url)?.clone();

        self.state.select_track(addon, &track).await?;
        tracing::info!(addon = %addon.key, track = %track.url, "track selected");

        self.tracker.set_selected_track(&addon.key, &track.url).await;
        self.observers
            .notify_track_selected(&addon.key, &track.url)
            .await;
        Ok(track)
    }

    /// Reveals a hidden add-on and re-runs its pass.
    pub async fn mark_discovered(&self, addon_key: &str) -> ManagerResult<ResolutionOutcome> {
        let addon = self.addon(addon_key)?;
        self.state.set_discovered(addon).await?;
        tracing::info!(addon = %addon.key, "add-on discovered");
        Ok(self.configure_initial_state(addon).await)
    }
}
