use std::path::Path;

use hangar_config::{Addon, AddonTrack};

use crate::inspector::InstallInspector;
use crate::state::{PersistedSnapshot, PersistedState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSelection {
    pub selected: Option<AddonTrack>,
    pub installed: Option<AddonTrack>,
}

/// Chooses the active track of an add-on.
///
/// A persisted selection always wins. Otherwise a managed install selects the
/// track it was installed from, and anything else falls back to the first
/// track. Selections and installed tracks are only persisted when nothing was
/// persisted before.
pub struct TrackSelector<'a> {
    state: &'a PersistedState,
    inspector: &'a dyn InstallInspector,
}

impl<'a> TrackSelector<'a> {
    pub fn new(state: &'a PersistedState, inspector: &'a dyn InstallInspector) -> Self {
        Self { state, inspector }
    }

    pub async fn select_tracks(
        &self,
        addon: &Addon,
        install_dir: &Path,
        persisted: &PersistedSnapshot,
    ) -> TrackSelection {
        let mut installed = persisted.installed_track.clone();

        let candidate = if !self.inspector.is_managed_install(install_dir) {
            tracing::debug!(addon = %addon.key, "not a managed install");
            addon.default_track().cloned()
        } else {
            match self.inspector.current_install_manifest(install_dir) {
                Ok(manifest) => {
                    let matched = addon.track_for_source(&manifest.source).cloned();
                    tracing::debug!(
                        addon = %addon.key,
                        source = %manifest.source,
                        track = ?matched.as_ref().map(|track| &track.url),
                        "matched installed track"
                    );
                    if let Some(track) = &matched {
                        if installed.is_none() {
                            self.persist_installed(addon, track).await;
                            installed = Some(track.clone());
                        }
                    }
                    matched
                }
                Err(e) => {
                    tracing::warn!(addon = %addon.key, error = %e, "could not read install manifest, treating as not installed");
                    addon.default_track().cloned()
                }
            }
        };

        let selected = match &persisted.selected_track {
            Some(track) => Some(track.clone()),
            None => {
                if let Some(track) = &candidate {
                    self.persist_selected(addon, track).await;
                }
                candidate
            }
        };

        TrackSelection {
            selected,
            installed,
        }
    }

    async fn persist_selected(&self, addon: &Addon, track: &AddonTrack) {
        if let Err(e) = self.state.set_selected_track_if_absent(addon, track).await {
            tracing::warn!(addon = %addon.key, error = %e, "failed to persist selected track");
        }
    }

    async fn persist_installed(&self, addon: &Addon, track: &AddonTrack) {
        if let Err(e) = self.state.set_installed_track_if_absent(addon, track).await {
            tracing::warn!(addon = %addon.key, error = %e, "failed to persist installed track");
        }
    }
}
