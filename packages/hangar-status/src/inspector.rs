use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use hangar_utils::http::{get, http_status_is_ok, with_cache_bust};
use hangar_utils::Uri;

pub const INSTALL_MANIFEST: &str = "install.json";
pub const MODULES_MANIFEST: &str = "modules.json";
const GIT_DIR: &str = ".git";

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest {path}: {message}")]
    Manifest { path: String, message: String },
    #[error("update check against {url} failed: {message}")]
    Network { url: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHash {
    pub name: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseHash {
    pub hash: String,
}

/// `install.json` written next to a managed install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    /// Track url the install was downloaded from.
    pub source: String,
    #[serde(default)]
    pub base: Option<BaseHash>,
    #[serde(default)]
    pub modules: Vec<ModuleHash>,
}

/// `modules.json` published at a track url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionManifest {
    pub base: BaseHash,
    #[serde(default)]
    pub modules: Vec<ModuleHash>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateCheckOptions {
    pub force_cache_bust: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateInfo {
    pub is_fresh_install: bool,
    pub needs_update: bool,
}

/// Local install inspection and update checking.
#[async_trait]
pub trait InstallInspector: Send + Sync {
    fn install_dir_exists(&self, install_dir: &Path) -> bool {
        install_dir.exists()
    }

    /// Whether the directory carries a recorded provenance.
    fn is_managed_install(&self, install_dir: &Path) -> bool;

    fn current_install_manifest(&self, install_dir: &Path) -> Result<InstallManifest, InspectError>;

    fn is_git_checkout(&self, install_dir: &Path) -> bool;

    async fn check_for_update(
        &self,
        url: &str,
        install_dir: &Path,
        options: UpdateCheckOptions,
    ) -> Result<UpdateInfo, InspectError>;
}

/// Inspector reading manifests from disk and distribution manifests over HTTP.
#[derive(Debug, Default, Clone)]
pub struct FsInstallInspector;

impl FsInstallInspector {
    pub fn new() -> Self {
        FsInstallInspector
    }

    async fn fetch_distribution(
        &self,
        url: &str,
        options: UpdateCheckOptions,
    ) -> Result<DistributionManifest, InspectError> {
        let mut manifest_url = format!("{}/{}", url.trim_end_matches('/'), MODULES_MANIFEST);
        if options.force_cache_bust {
            manifest_url = with_cache_bust(&manifest_url);
        }
        let network_error = |message: String| InspectError::Network {
            url: manifest_url.clone(),
            message,
        };

        let uri = manifest_url
            .parse::<Uri>()
            .map_err(|e| network_error(e.to_string()))?;
        let rsp = get(uri, &HashMap::new())
            .await
            .map_err(|e| network_error(e.to_string()))?;
        if !http_status_is_ok(rsp.status) {
            return Err(network_error(format!("HTTP status {}", rsp.status)));
        }
        serde_json::from_str(&rsp.text()).map_err(|e| InspectError::Manifest {
            path: manifest_url.clone(),
            message: e.to_string(),
        })
    }
}

/// Compares the installed module hashes against a distribution.
pub fn differs_from(local: &InstallManifest, remote: &DistributionManifest) -> bool {
    let local_base = local.base.as_ref().map(|base| base.hash.as_str());
    if local_base != Some(remote.base.hash.as_str()) {
        return true;
    }
    let index = |modules: &[ModuleHash]| -> BTreeMap<String, String> {
        modules
            .iter()
            .map(|module| (module.name.clone(), module.hash.clone()))
            .collect()
    };
    index(&local.modules) != index(&remote.modules)
}

#[async_trait]
impl InstallInspector for FsInstallInspector {
    fn is_managed_install(&self, install_dir: &Path) -> bool {
        install_dir.join(INSTALL_MANIFEST).is_file()
    }

    fn current_install_manifest(&self, install_dir: &Path) -> Result<InstallManifest, InspectError> {
        let path = install_dir.join(INSTALL_MANIFEST);
        let content = std::fs::read_to_string(&path).map_err(|source| InspectError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| InspectError::Manifest {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn is_git_checkout(&self, install_dir: &Path) -> bool {
        if install_dir.join(GIT_DIR).exists() {
            return true;
        }
        // development installs link the build output of a repository checkout
        let is_symlink = std::fs::symlink_metadata(install_dir)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_symlink {
            return false;
        }
        std::fs::canonicalize(install_dir)
            .ok()
            .and_then(|target| target.parent().map(|parent| parent.join(GIT_DIR)))
            .is_some_and(|git_dir| git_dir.exists())
    }

    async fn check_for_update(
        &self,
        url: &str,
        install_dir: &Path,
        options: UpdateCheckOptions,
    ) -> Result<UpdateInfo, InspectError> {
        let remote = self.fetch_distribution(url, options).await?;
        if !self.is_managed_install(install_dir) {
            return Ok(UpdateInfo {
                is_fresh_install: true,
                needs_update: true,
            });
        }
        let local = self.current_install_manifest(install_dir)?;
        Ok(UpdateInfo {
            is_fresh_install: false,
            needs_update: differs_from(&local, &remote),
        })
    }
}
