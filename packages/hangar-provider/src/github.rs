use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use crate::data::{GithubCommit, GithubRelease};
use crate::error::{ResolveError, ResolveResult};
use crate::fetch::fetch_body;

pub const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "hangar";

/// Release metadata service: release listings and branch heads.
#[async_trait]
pub trait ReleaseMetadataService: Send + Sync {
    /// Published releases of `owner/repo`, newest first.
    async fn list_releases(&self, owner: &str, repo: &str) -> ResolveResult<Vec<GithubRelease>>;

    /// Head commit of `branch`.
    async fn newest_commit(&self, owner: &str, repo: &str, branch: &str)
        -> ResolveResult<GithubCommit>;
}

#[derive(Deserialize)]
struct ApiRelease {
    name: Option<String>,
    tag_name: String,
    published_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    html_url: String,
}

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Deserialize)]
struct ApiCommitDetail {
    committer: Option<ApiSignature>,
    author: Option<ApiSignature>,
}

#[derive(Deserialize)]
struct ApiSignature {
    date: DateTime<Utc>,
}

pub struct GitHubProvider {
    api_url: String,
    token: Option<String>,
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubProvider {
    pub fn new() -> Self {
        Self::with_api_url(GITHUB_API_URL)
    }

    /// Points the provider at another API root, e.g. GitHub Enterprise or a mirror.
    pub fn with_api_url(api_url: &str) -> Self {
        GitHubProvider {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn token(mut self, token: Option<&str>) -> Self {
        // blank tokens are ignored
        self.token = token
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.to_string());
        self
    }

    fn get_header_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
        ]);
        if let Some(token) = &self.token {
            map.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        map
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> ResolveResult<T> {
        let body = fetch_body(url, &self.get_header_map()).await?;
        serde_json::from_str(&body).map_err(|e| ResolveError::parse(what, e))
    }
}

#[async_trait]
impl ReleaseMetadataService for GitHubProvider {
    async fn list_releases(&self, owner: &str, repo: &str) -> ResolveResult<Vec<GithubRelease>> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, owner, repo);
        let releases: Vec<ApiRelease> = self.get_json(&url, "GitHub release list").await?;
        tracing::debug!(owner, repo, count = releases.len(), "fetched releases");

        Ok(releases
            .into_iter()
            .filter_map(|release| {
                // drafts have neither timestamp set and are skipped
                let published_at = release.published_at.or(release.created_at)?;
                let name = release
                    .name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(release.tag_name);
                Some(GithubRelease {
                    name,
                    published_at,
                    html_url: release.html_url,
                })
            })
            .collect())
    }

    async fn newest_commit(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> ResolveResult<GithubCommit> {
        let url = format!("{}/repos/{}/{}/commits/{}", self.api_url, owner, repo, branch);
        let commit: ApiCommit = self.get_json(&url, "GitHub commit").await?;
        let timestamp = commit
            .commit
            .committer
            .or(commit.commit.author)
            .map(|signature| signature.date)
            .ok_or_else(|| ResolveError::parse("GitHub commit", "commit has no date"))?;
        Ok(GithubCommit {
            sha: commit.sha,
            timestamp,
        })
    }
}
