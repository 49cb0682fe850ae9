//! Per-add-on key namespaces of the settings store.

pub const SELECTED_TRACKS: &str = "selectedTracks";
pub const INSTALLED_TRACKS: &str = "installedTracks";
pub const INSTALL_STATUS: &str = "installStatus";
pub const DISCOVERED_ADDONS: &str = "cache.main.discoveredAddons";

pub fn selected_track(addon_key: &str) -> String {
    scoped(SELECTED_TRACKS, addon_key)
}

pub fn installed_track(addon_key: &str) -> String {
    scoped(INSTALLED_TRACKS, addon_key)
}

pub fn install_status(addon_key: &str) -> String {
    scoped(INSTALL_STATUS, addon_key)
}

pub fn discovered(addon_key: &str) -> String {
    scoped(DISCOVERED_ADDONS, addon_key)
}

fn scoped(namespace: &str, addon_key: &str) -> String {
    format!("{}.{}", namespace, addon_key)
}
