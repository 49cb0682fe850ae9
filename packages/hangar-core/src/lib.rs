// Core module that ties everything together

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

pub use hangar_config::{Addon, AddonTrack, Catalog, ConfigError, HangarConfig, ReleaseModel};
pub use hangar_provider::{CdnProvider, GitHubProvider, ReleaseInfo, ReleaseResolver, ResolveError};
pub use hangar_status::{
    AddonManager, AddonObserver, AddonStatusInfo, FsInstallInspector, InstallInspector,
    InstallStatus, ManagerError, ResolutionOutcome,
};
pub use hangar_store::{JsonFileBackend, SettingsStore, StoreError};
pub use hangar_utils::{http, time};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Manager(#[from] ManagerError),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Resolver wired to the GitHub API and owner named in `config`.
pub fn resolver_from_config(config: &HangarConfig) -> ReleaseResolver {
    let github = GitHubProvider::with_api_url(&config.github_api_url).token(config.github_token());
    ReleaseResolver::new(Arc::new(github), Arc::new(CdnProvider::new())).owner(&config.github_owner)
}

pub struct Core {
    config: HangarConfig,
    manager: AddonManager,
    session: OnceCell<()>,
}

impl Core {
    /// Loads the catalog and the settings store named by `config`.
    pub async fn new(config: HangarConfig) -> CoreResult<Self> {
        let catalog = Catalog::load(&config.catalog_path()?)?;
        let store_path = config.store_path()?;
        tracing::debug!(store = %store_path.display(), "opening settings store");
        let store = SettingsStore::new(Arc::new(JsonFileBackend::new(&store_path)));
        Self::with_parts(config, catalog, store, Arc::new(FsInstallInspector::new())).await
    }

    pub async fn with_parts(
        config: HangarConfig,
        catalog: Catalog,
        store: SettingsStore,
        inspector: Arc<dyn InstallInspector>,
    ) -> CoreResult<Self> {
        let manager = AddonManager::new(
            catalog,
            config.community_dir.clone(),
            store,
            inspector,
            resolver_from_config(&config),
        );
        tracing::info!(
            addons = manager.catalog().addons.len(),
            community = %config.community_dir.display(),
            "core ready"
        );
        Ok(Self {
            config,
            manager,
            session: OnceCell::new(),
        })
    }

    /// Install statuses only describe the current session, so they are
    /// cleared once, before the first pass. Commands that never run a pass
    /// leave them alone.
    async fn start_session(&self) -> CoreResult<()> {
        self.session
            .get_or_try_init(|| async {
                tracing::debug!("clearing install statuses of the previous session");
                self.manager.reset_install_statuses().await
            })
            .await?;
        Ok(())
    }

    pub fn config(&self) -> &HangarConfig {
        &self.config
    }

    pub fn manager(&self) -> &AddonManager {
        &self.manager
    }

    pub async fn refresh_all(&self) -> CoreResult<Vec<ResolutionOutcome>> {
        self.start_session().await?;
        Ok(self.manager.configure_all().await)
    }

    pub async fn refresh(&self, addon_key: &str) -> CoreResult<ResolutionOutcome> {
        self.start_session().await?;
        Ok(self.manager.configure_addon(addon_key).await?)
    }

    pub async fn get_all_statuses(&self) -> Vec<AddonStatusInfo> {
        self.manager.tracker().get_all_statuses().await
    }

    pub async fn latest_version(
        &self,
        addon_key: &str,
        track_url: Option<&str>,
    ) -> CoreResult<ReleaseInfo> {
        Ok(self.manager.latest_version(addon_key, track_url).await?)
    }

    pub async fn select_track(&self, addon_key: &str, track_url: &str) -> CoreResult<AddonTrack> {
        Ok(self.manager.select_track(addon_key, track_url).await?)
    }

    pub async fn discover(&self, addon_key: &str) -> CoreResult<ResolutionOutcome> {
        self.start_session().await?;
        Ok(self.manager.mark_discovered(addon_key).await?)
    }
}
