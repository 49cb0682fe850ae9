use std::sync::Arc;

use hangar_config::{Addon, AddonTrack, ReleaseModel};

use crate::cdn::{manifest_url, parse_manifest, CdnProvider, ManifestSource};
use crate::data::ReleaseInfo;
use crate::error::{ResolveError, ResolveResult};
use crate::github::{GitHubProvider, ReleaseMetadataService};

pub const DEFAULT_OWNER: &str = "flybywiresim";
const SHORT_SHA_LEN: usize = 7;

/// Resolves the latest version of a track from the backend its release model names.
#[derive(Clone)]
pub struct ReleaseResolver {
    github: Arc<dyn ReleaseMetadataService>,
    cdn: Arc<dyn ManifestSource>,
    owner: String,
}

impl Default for ReleaseResolver {
    fn default() -> Self {
        Self::new(Arc::new(GitHubProvider::new()), Arc::new(CdnProvider::new()))
    }
}

impl ReleaseResolver {
    pub fn new(github: Arc<dyn ReleaseMetadataService>, cdn: Arc<dyn ManifestSource>) -> Self {
        Self {
            github,
            cdn,
            owner: DEFAULT_OWNER.to_string(),
        }
    }

    /// Repository owner used for GitHub lookups.
    pub fn owner(mut self, owner: &str) -> Self {
        self.owner = owner.to_string();
        self
    }

    pub async fn latest_version_for_track(
        &self,
        addon: &Addon,
        track: &AddonTrack,
    ) -> ResolveResult<ReleaseInfo> {
        tracing::debug!(addon = %addon.key, track = %track.url, "resolving latest version");
        match &track.release_model {
            ReleaseModel::GithubRelease => self.latest_released(addon).await,
            ReleaseModel::GithubBranch { branch } => self.latest_rolling(addon, branch).await,
            ReleaseModel::Cdn { url } => {
                self.latest_from_cdn(url.as_deref().unwrap_or(&track.url))
                    .await
            }
        }
    }

    async fn latest_released(&self, addon: &Addon) -> ResolveResult<ReleaseInfo> {
        let releases = self.github.list_releases(&self.owner, &addon.repo_name).await?;
        let newest = releases.into_iter().next().ok_or_else(|| {
            ResolveError::NotFound(format!("release of {}/{}", self.owner, addon.repo_name))
        })?;
        Ok(ReleaseInfo {
            name: newest.name,
            release_date: newest.published_at,
            changelog_url: Some(newest.html_url),
        })
    }

    async fn latest_rolling(&self, addon: &Addon, branch: &str) -> ResolveResult<ReleaseInfo> {
        let commit = self
            .github
            .newest_commit(&self.owner, &addon.repo_name, branch)
            .await?;
        let short_sha = commit
            .sha
            .get(..SHORT_SHA_LEN)
            .filter(|sha| sha.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| {
                ResolveError::parse("commit sha", format!("'{}' is not a commit hash", commit.sha))
            })?;
        Ok(ReleaseInfo {
            name: short_sha.to_string(),
            release_date: commit.timestamp,
            changelog_url: None,
        })
    }

    async fn latest_from_cdn(&self, base_url: &str) -> ResolveResult<ReleaseInfo> {
        let text = self.cdn.fetch_text(&manifest_url(base_url)).await?;
        let manifest = parse_manifest(&text)?;
        // parse_manifest guarantees at least one release
        let newest = manifest
            .releases
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::parse("releases.yaml", "no releases listed"))?;
        Ok(ReleaseInfo {
            name: newest.name,
            release_date: newest.date,
            changelog_url: None,
        })
    }
}
