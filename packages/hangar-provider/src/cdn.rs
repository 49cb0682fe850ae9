use async_trait::async_trait;
use std::collections::HashMap;

use crate::data::CdnManifest;
use crate::error::{ResolveError, ResolveResult};
use crate::fetch::fetch_body;

pub const RELEASES_MANIFEST: &str = "releases.yaml";

/// Plain-text document fetch, used for CDN release manifests.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> ResolveResult<String>;
}

#[derive(Default)]
pub struct CdnProvider;

impl CdnProvider {
    pub fn new() -> Self {
        CdnProvider
    }
}

#[async_trait]
impl ManifestSource for CdnProvider {
    async fn fetch_text(&self, url: &str) -> ResolveResult<String> {
        fetch_body(url, &HashMap::new()).await
    }
}

pub fn manifest_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), RELEASES_MANIFEST)
}

/// Parses `releases.yaml`. An empty release list is a parse failure.
pub fn parse_manifest(text: &str) -> ResolveResult<CdnManifest> {
    let manifest: CdnManifest =
        serde_yaml::from_str(text).map_err(|e| ResolveError::parse(RELEASES_MANIFEST, e))?;
    if manifest.releases.is_empty() {
        return Err(ResolveError::parse(RELEASES_MANIFEST, "no releases listed"));
    }
    Ok(manifest)
}
