use serde_json::Value;

use hangar_config::{Addon, AddonTrack};
use hangar_store::{keys, SettingsStore, StoreResult};

use crate::install_status::InstallStatus;

/// Persisted per-add-on state as read at the start of a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSnapshot {
    pub selected_track: Option<AddonTrack>,
    pub installed_track: Option<AddonTrack>,
    pub install_status: Option<InstallStatus>,
    pub discovered: bool,
}

/// Typed view of the settings store, scoped by `addon.key`.
///
/// Tracks are stored by url and resolved back against the add-on's track list.
#[derive(Clone)]
pub struct PersistedState {
    store: SettingsStore,
}

impl PersistedState {
    pub fn new(store: SettingsStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Reads everything a pass needs. Unreadable values count as absent.
    pub async fn snapshot(&self, addon: &Addon) -> PersistedSnapshot {
        PersistedSnapshot {
            selected_track: self.track(addon, &keys::selected_track(&addon.key)).await,
            installed_track: self.track(addon, &keys::installed_track(&addon.key)).await,
            install_status: self.read(&keys::install_status(&addon.key)).await,
            discovered: self
                .read(&keys::discovered(&addon.key))
                .await
                .unwrap_or(false),
        }
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable persisted value");
                None
            }
        }
    }

    /// A url that no longer resolves is dropped from the store, so the next
    /// write-if-absent can replace it.
    async fn track(&self, addon: &Addon, key: &str) -> Option<AddonTrack> {
        let url: String = self.read(key).await?;
        let track = addon.track_for_source(&url).cloned();
        if track.is_none() {
            tracing::warn!(addon = %addon.key, key, url = %url, "dropping persisted track no longer in catalog");
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!(key, error = %e, "failed to drop stale persisted track");
            }
        }
        track
    }

    pub async fn set_selected_track_if_absent(
        &self,
        addon: &Addon,
        track: &AddonTrack,
    ) -> StoreResult<bool> {
        self.store
            .set_if_absent(&keys::selected_track(&addon.key), &track.url)
            .await
    }

    pub async fn set_installed_track_if_absent(
        &self,
        addon: &Addon,
        track: &AddonTrack,
    ) -> StoreResult<bool> {
        self.store
            .set_if_absent(&keys::installed_track(&addon.key), &track.url)
            .await
    }

    /// Explicit user choice; replaces any previous selection.
    pub async fn select_track(&self, addon: &Addon, track: &AddonTrack) -> StoreResult<()> {
        self.store
            .set(&keys::selected_track(&addon.key), &track.url)
            .await
    }

    /// Writes `status` only if none is stored or the stored one is `Hidden`.
    pub async fn record_install_status(
        &self,
        addon: &Addon,
        status: InstallStatus,
    ) -> StoreResult<bool> {
        let hidden = serde_json::to_value(InstallStatus::Hidden)?;
        self.store
            .set_unless(&keys::install_status(&addon.key), &status, |existing: &Value| {
                *existing != hidden
            })
            .await
    }

    pub async fn clear_install_status(&self, addon: &Addon) -> StoreResult<()> {
        self.store.remove(&keys::install_status(&addon.key)).await
    }

    pub async fn set_discovered(&self, addon: &Addon) -> StoreResult<()> {
        self.store.set(&keys::discovered(&addon.key), &true).await
    }
}
