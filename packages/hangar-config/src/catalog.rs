use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Add-on catalog
///
/// JSON Schema:
/// ```json
/// {
///   "addons": [
///     {
///       "key": "A32NX",
///       "repoName": "a32nx",
///       "targetDirectory": "flybywire-aircraft-a320-neo",
///       "hidden": false,
///       "tracks": [
///         {
///           "url": "https://cdn.flybywiresim.com/addons/a32nx/master",
///           "alternativeUrls": [],
///           "releaseModel": { "type": "githubBranch", "branch": "master" }
///         }
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub addons: Vec<Addon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub key: String,
    pub repo_name: String,
    pub target_directory: String,
    #[serde(default)]
    pub hidden: bool,
    pub tracks: Vec<AddonTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonTrack {
    pub url: String,
    #[serde(default)]
    pub alternative_urls: Vec<String>,
    pub release_model: ReleaseModel,
}

/// Backend used to determine the latest version of a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReleaseModel {
    #[serde(rename = "githubRelease")]
    GithubRelease,
    #[serde(rename = "githubBranch")]
    GithubBranch { branch: String },
    #[serde(rename = "CDN")]
    Cdn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl AddonTrack {
    /// A track is identified by its url or any of its legacy aliases.
    pub fn matches_source(&self, source: &str) -> bool {
        self.url == source || self.alternative_urls.iter().any(|url| url == source)
    }
}

impl Addon {
    pub fn default_track(&self) -> Option<&AddonTrack> {
        self.tracks.first()
    }

    pub fn track_by_url(&self, url: &str) -> Option<&AddonTrack> {
        self.tracks.iter().find(|track| track.url == url)
    }

    /// Finds the track an install came from: exact url first, then aliases.
    pub fn track_for_source(&self, source: &str) -> Option<&AddonTrack> {
        self.track_by_url(source).or_else(|| {
            self.tracks
                .iter()
                .find(|track| track.matches_source(source))
        })
    }
}

impl Catalog {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), addons = catalog.addons.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let catalog: Catalog = serde_json::from_str(content).map_err(|e| {
            // serde reports unknown `type` tags as a data error; surface them as configuration errors
            if e.classify() == serde_json::error::Category::Data {
                ConfigError::Configuration(e.to_string())
            } else {
                ConfigError::Json(e)
            }
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut keys = HashSet::new();
        for addon in &self.addons {
            if !keys.insert(addon.key.as_str()) {
                return Err(ConfigError::Configuration(format!(
                    "duplicate addon key '{}'",
                    addon.key
                )));
            }
            if addon.tracks.is_empty() {
                return Err(ConfigError::Configuration(format!(
                    "addon '{}' has no tracks",
                    addon.key
                )));
            }
            for track in &addon.tracks {
                if let ReleaseModel::GithubBranch { branch } = &track.release_model {
                    if branch.trim().is_empty() {
                        return Err(ConfigError::Configuration(format!(
                            "track '{}' of addon '{}' has an empty branch",
                            track.url, addon.key
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Addon> {
        self.addons.iter().find(|addon| addon.key == key)
    }
}
