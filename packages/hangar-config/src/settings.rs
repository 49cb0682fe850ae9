use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::utils::get_data_path;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_OWNER: &str = "flybywiresim";
pub const CATALOG_FILE_NAME: &str = "catalog.json";
pub const STORE_FILE_NAME: &str = "settings.json";

/// Runtime configuration
///
/// JSON Schema (every field optional):
/// ```json
/// {
///   "community_dir": "/path/to/Community",
///   "catalog_path": "/path/to/catalog.json",
///   "store_path": "/path/to/settings.json",
///   "github_api_url": "https://api.github.com",
///   "github_owner": "flybywiresim",
///   "github_token": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HangarConfig {
    pub community_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub github_api_url: String,
    pub github_owner: String,
    pub github_token: Option<String>,
}

impl Default for HangarConfig {
    fn default() -> Self {
        Self {
            community_dir: PathBuf::from("."),
            catalog_path: None,
            store_path: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_owner: DEFAULT_GITHUB_OWNER.to_string(),
            github_token: None,
        }
    }
}

impl HangarConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn catalog_path(&self) -> ConfigResult<PathBuf> {
        self.path_or_data_dir(&self.catalog_path, CATALOG_FILE_NAME)
    }

    pub fn store_path(&self) -> ConfigResult<PathBuf> {
        self.path_or_data_dir(&self.store_path, STORE_FILE_NAME)
    }

    /// Token, ignoring blank values.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    fn path_or_data_dir(&self, path: &Option<PathBuf>, file_name: &str) -> ConfigResult<PathBuf> {
        match path {
            Some(path) => Ok(path.clone()),
            None => get_data_path(file_name).map_err(|source| ConfigError::Io {
                path: PathBuf::from(file_name),
                source,
            }),
        }
    }
}
