use serde::{Deserialize, Serialize};

/// Install state of an add-on relative to the latest version of its selected track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InstallStatus {
    /// Status could not be determined
    #[default]
    Unknown,
    /// Add-on is hidden and has not been discovered yet
    Hidden,
    /// Nothing is installed yet
    FreshInstall,
    /// Install directory is a source-controlled checkout, updates are managed by git
    GitInstall,
    /// A newer version is available on the selected track
    NeedsUpdate,
    /// Installed copy matches the latest version
    UpToDate,
}

impl InstallStatus {
    pub fn is_installed(&self) -> bool {
        matches!(
            self,
            InstallStatus::GitInstall | InstallStatus::NeedsUpdate | InstallStatus::UpToDate
        )
    }

    pub fn has_updates(&self) -> bool {
        matches!(self, InstallStatus::NeedsUpdate)
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, InstallStatus::Hidden)
    }

    pub fn description(&self) -> &'static str {
        match self {
            InstallStatus::Unknown => "Unknown",
            InstallStatus::Hidden => "Hidden",
            InstallStatus::FreshInstall => "Not installed",
            InstallStatus::GitInstall => "Git install",
            InstallStatus::NeedsUpdate => "Update available",
            InstallStatus::UpToDate => "Up to date",
        }
    }
}

impl std::fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
