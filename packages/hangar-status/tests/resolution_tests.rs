use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hangar_config::{Addon, AddonTrack, Catalog, ReleaseModel};
use hangar_provider::{
    GithubCommit, GithubRelease, ManifestSource, ReleaseMetadataService, ReleaseResolver,
    ResolveError, ResolveResult,
};
use hangar_status::{
    AddonManager, AddonObserver, DetectionRule, FsInstallInspector, InspectError,
    InstallInspector, InstallManifest, InstallStatus, UpdateCheckOptions, UpdateInfo,
};
use hangar_store::SettingsStore;

/// Scripted install inspector that records update checks.
struct FakeInspector {
    dir_exists: bool,
    managed: bool,
    source: Option<String>,
    git: bool,
    update: Result<UpdateInfo, String>,
    update_checks: AtomicUsize,
    last_options: Mutex<Option<UpdateCheckOptions>>,
}

impl FakeInspector {
    fn new() -> Self {
        Self {
            dir_exists: true,
            managed: false,
            source: None,
            git: false,
            update: Ok(UpdateInfo::default()),
            update_checks: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    fn missing_dir(mut self) -> Self {
        self.dir_exists = false;
        self
    }

    fn managed(mut self, source: &str) -> Self {
        self.managed = true;
        self.source = Some(source.to_string());
        self
    }

    fn git(mut self) -> Self {
        self.git = true;
        self
    }

    fn update(mut self, update: Result<UpdateInfo, String>) -> Self {
        self.update = update;
        self
    }

    fn update_checks(&self) -> usize {
        self.update_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstallInspector for FakeInspector {
    fn install_dir_exists(&self, _install_dir: &Path) -> bool {
        self.dir_exists
    }

    fn is_managed_install(&self, _install_dir: &Path) -> bool {
        self.managed
    }

    fn current_install_manifest(&self, install_dir: &Path) -> Result<InstallManifest, InspectError> {
        match &self.source {
            Some(source) => Ok(InstallManifest {
                source: source.clone(),
                base: None,
                modules: vec![],
            }),
            None => Err(InspectError::Manifest {
                path: install_dir.display().to_string(),
                message: "unreadable".to_string(),
            }),
        }
    }

    fn is_git_checkout(&self, _install_dir: &Path) -> bool {
        self.git
    }

    async fn check_for_update(
        &self,
        url: &str,
        _install_dir: &Path,
        options: UpdateCheckOptions,
    ) -> Result<UpdateInfo, InspectError> {
        self.update_checks.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        self.update.clone().map_err(|message| InspectError::Network {
            url: url.to_string(),
            message,
        })
    }
}

struct NoGithub;

#[async_trait]
impl ReleaseMetadataService for NoGithub {
    async fn list_releases(&self, _owner: &str, repo: &str) -> ResolveResult<Vec<GithubRelease>> {
        Err(ResolveError::NotFound(format!("no releases for {}", repo)))
    }

    async fn newest_commit(
        &self,
        _owner: &str,
        repo: &str,
        _branch: &str,
    ) -> ResolveResult<GithubCommit> {
        Err(ResolveError::NotFound(format!("no commits for {}", repo)))
    }
}

struct StaticCdn(&'static str);

#[async_trait]
impl ManifestSource for StaticCdn {
    async fn fetch_text(&self, _url: &str) -> ResolveResult<String> {
        Ok(self.0.to_string())
    }
}

fn track(url: &str, alternative_urls: &[&str]) -> AddonTrack {
    AddonTrack {
        url: url.to_string(),
        alternative_urls: alternative_urls.iter().map(|url| url.to_string()).collect(),
        release_model: ReleaseModel::GithubRelease,
    }
}

fn addon(key: &str, hidden: bool, tracks: Vec<AddonTrack>) -> Addon {
    Addon {
        key: key.to_string(),
        repo_name: key.to_lowercase(),
        target_directory: key.to_lowercase(),
        hidden,
        tracks,
    }
}

fn addon_x() -> Addon {
    addon("X", false, vec![track("A", &[])])
}

fn addon_y() -> Addon {
    addon("Y", false, vec![track("A", &[]), track("B", &["legacyB"])])
}

fn manager_with(
    addons: Vec<Addon>,
    store: SettingsStore,
    inspector: Arc<FakeInspector>,
) -> AddonManager {
    AddonManager::new(
        Catalog { addons },
        "/community",
        store,
        inspector,
        ReleaseResolver::new(Arc::new(NoGithub), Arc::new(StaticCdn(""))),
    )
}

#[tokio::test]
async fn test_hidden_undiscovered_wins_over_everything() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().missing_dir().git());
    let hidden = addon("H", true, vec![track("A", &[])]);
    let manager = manager_with(vec![hidden.clone()], store.clone(), inspector.clone());

    let outcome = manager.configure_initial_state(&hidden).await;
    assert_eq!(outcome.status, InstallStatus::Hidden);
    assert_eq!(outcome.rule, DetectionRule::HiddenUndiscovered);
    assert!(outcome.status_written);
    assert_eq!(inspector.update_checks(), 0);

    // discovering it lets the next pass overwrite the persisted Hidden
    let outcome = manager.mark_discovered("H").await.unwrap();
    assert_eq!(outcome.status, InstallStatus::FreshInstall);
    assert!(outcome.status_written);
    assert_eq!(
        store.get::<InstallStatus>("installStatus.H").await.unwrap(),
        Some(InstallStatus::FreshInstall)
    );
}

#[tokio::test]
async fn test_unmatched_source_is_unknown_without_update_check() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().managed("somewhere-else"));
    let manager = manager_with(vec![addon_y()], store.clone(), inspector.clone());

    let outcome = manager.configure_initial_state(&addon_y()).await;
    assert_eq!(outcome.status, InstallStatus::Unknown);
    assert_eq!(outcome.rule, DetectionRule::NoTrackSelected);
    assert!(outcome.selection.selected.is_none());
    assert_eq!(inspector.update_checks(), 0);
    assert_eq!(store.get::<String>("selectedTracks.Y").await.unwrap(), None);
}

#[tokio::test]
async fn test_unreadable_manifest_falls_back_to_default_track() {
    let store = SettingsStore::in_memory();
    let mut inspector = FakeInspector::new();
    inspector.managed = true;
    let manager = manager_with(vec![addon_y()], store.clone(), Arc::new(inspector));

    let outcome = manager.configure_initial_state(&addon_y()).await;
    assert_eq!(outcome.selection.selected.unwrap().url, "A");
    assert!(outcome.selection.installed.is_none());
    assert_eq!(outcome.status, InstallStatus::UpToDate);
    assert_eq!(
        store.get::<String>("installedTracks.Y").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_second_pass_is_idempotent() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().update(Ok(UpdateInfo {
        is_fresh_install: false,
        needs_update: true,
    })));
    let manager = manager_with(vec![addon_x()], store.clone(), inspector);

    let first = manager.configure_initial_state(&addon_x()).await;
    let second = manager.configure_initial_state(&addon_x()).await;

    assert_eq!(first.status, InstallStatus::NeedsUpdate);
    assert_eq!(second.status, first.status);
    assert!(first.status_written);
    assert!(!second.status_written);
    assert_eq!(second.selection, first.selection);
}

#[tokio::test]
async fn test_missing_directory_precedes_git_check() {
    let inspector = Arc::new(FakeInspector::new().missing_dir().git());
    let manager = manager_with(vec![addon_x()], SettingsStore::in_memory(), inspector.clone());

    let outcome = manager.configure_initial_state(&addon_x()).await;
    assert_eq!(outcome.status, InstallStatus::FreshInstall);
    assert_eq!(outcome.rule, DetectionRule::MissingInstallDir);
    assert_eq!(inspector.update_checks(), 0);
}

#[tokio::test]
async fn test_git_checkout_skips_update_check() {
    let inspector = Arc::new(FakeInspector::new().git());
    let manager = manager_with(vec![addon_x()], SettingsStore::in_memory(), inspector.clone());

    let outcome = manager.configure_initial_state(&addon_x()).await;
    assert_eq!(outcome.status, InstallStatus::GitInstall);
    assert_eq!(inspector.update_checks(), 0);
}

#[tokio::test]
async fn test_fresh_addon_persists_default_track_and_fresh_install() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().missing_dir());
    let manager = manager_with(vec![addon_x()], store.clone(), inspector);

    let outcome = manager.configure_initial_state(&addon_x()).await;
    assert_eq!(outcome.status, InstallStatus::FreshInstall);
    assert_eq!(
        store.get::<String>("selectedTracks.X").await.unwrap(),
        Some("A".to_string())
    );
    assert_eq!(
        store.get::<InstallStatus>("installStatus.X").await.unwrap(),
        Some(InstallStatus::FreshInstall)
    );
}

#[tokio::test]
async fn test_installed_alias_selects_and_persists_matching_track() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().managed("legacyB"));
    let manager = manager_with(vec![addon_y()], store.clone(), inspector);

    let outcome = manager.configure_initial_state(&addon_y()).await;
    assert_eq!(outcome.selection.selected.as_ref().unwrap().url, "B");
    assert_eq!(outcome.selection.installed.as_ref().unwrap().url, "B");
    assert_eq!(
        store.get::<String>("installedTracks.Y").await.unwrap(),
        Some("B".to_string())
    );
    assert_eq!(
        store.get::<String>("selectedTracks.Y").await.unwrap(),
        Some("B".to_string())
    );
}

#[tokio::test]
async fn test_persisted_selection_wins_and_installed_is_not_overwritten() {
    let store = SettingsStore::in_memory();
    store.set("selectedTracks.Y", &"A").await.unwrap();
    store.set("installedTracks.Y", &"A").await.unwrap();
    let inspector = Arc::new(FakeInspector::new().managed("B"));
    let manager = manager_with(vec![addon_y()], store.clone(), inspector);

    let outcome = manager.configure_initial_state(&addon_y()).await;
    assert_eq!(outcome.selection.selected.unwrap().url, "A");
    assert_eq!(outcome.selection.installed.unwrap().url, "A");
    assert_eq!(
        store.get::<String>("installedTracks.Y").await.unwrap(),
        Some("A".to_string())
    );
}

#[tokio::test]
async fn test_update_check_error_degrades_to_unknown() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().update(Err("connection reset".to_string())));
    let manager = manager_with(vec![addon_x()], store.clone(), inspector.clone());

    let outcome = manager.configure_initial_state(&addon_x()).await;
    assert_eq!(outcome.status, InstallStatus::Unknown);
    assert_eq!(outcome.rule, DetectionRule::UpdateCheck);
    assert_eq!(inspector.update_checks(), 1);
    assert_eq!(
        *inspector.last_options.lock().unwrap(),
        Some(UpdateCheckOptions {
            force_cache_bust: true
        })
    );
}

#[tokio::test]
async fn test_update_check_results() {
    let cases = [
        (
            UpdateInfo {
                is_fresh_install: true,
                needs_update: true,
            },
            InstallStatus::FreshInstall,
        ),
        (
            UpdateInfo {
                is_fresh_install: false,
                needs_update: true,
            },
            InstallStatus::NeedsUpdate,
        ),
        (UpdateInfo::default(), InstallStatus::UpToDate),
    ];
    for (info, expected) in cases {
        let inspector = Arc::new(FakeInspector::new().update(Ok(info)));
        let manager = manager_with(vec![addon_x()], SettingsStore::in_memory(), inspector);
        assert_eq!(manager.configure_initial_state(&addon_x()).await.status, expected);
    }
}

#[tokio::test]
async fn test_configure_all_keeps_catalog_order() {
    let inspector = Arc::new(FakeInspector::new().missing_dir());
    let hidden = addon("H", true, vec![track("A", &[])]);
    let manager = manager_with(
        vec![addon_x(), hidden, addon_y()],
        SettingsStore::in_memory(),
        inspector,
    );

    let outcomes = manager.configure_all().await;
    let keys: Vec<&str> = outcomes.iter().map(|o| o.addon_key.as_str()).collect();
    assert_eq!(keys, vec!["X", "H", "Y"]);
    assert_eq!(outcomes[1].status, InstallStatus::Hidden);

    let statuses = manager.tracker().get_all_statuses().await;
    assert_eq!(statuses.len(), 3);
}

#[tokio::test]
async fn test_reset_install_statuses_allows_rewrite() {
    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().missing_dir());
    let manager = manager_with(vec![addon_x()], store.clone(), inspector);

    assert!(manager.configure_initial_state(&addon_x()).await.status_written);
    manager.reset_install_statuses().await.unwrap();
    assert_eq!(
        store.get::<InstallStatus>("installStatus.X").await.unwrap(),
        None
    );
    assert!(manager.configure_initial_state(&addon_x()).await.status_written);
}

#[tokio::test]
async fn test_select_track_overwrites_and_notifies() {
    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl AddonObserver for Recorder {
        async fn on_status_resolved(&self, addon_key: &str, status: InstallStatus) {
            self.0.lock().unwrap().push(format!("{}:{}", addon_key, status));
        }

        async fn on_track_selected(&self, addon_key: &str, track_url: &str) {
            self.0.lock().unwrap().push(format!("{}->{}", addon_key, track_url));
        }

        async fn on_latest_version(
            &self,
            _addon_key: &str,
            _release: &hangar_provider::ReleaseInfo,
        ) {
        }
    }

    let store = SettingsStore::in_memory();
    let inspector = Arc::new(FakeInspector::new().missing_dir());
    let manager = manager_with(vec![addon_y()], store.clone(), inspector);
    let recorder = Arc::new(Recorder::default());
    manager.observers().register(recorder.clone()).await;

    manager.configure_initial_state(&addon_y()).await;
    let track = manager.select_track("Y", "legacyB").await.unwrap();
    assert_eq!(track.url, "B");
    assert_eq!(
        store.get::<String>("selectedTracks.Y").await.unwrap(),
        Some("B".to_string())
    );

    assert!(matches!(
        manager.select_track("Y", "C").await,
        Err(hangar_status::ManagerError::UnknownTrack { .. })
    ));
    assert!(matches!(
        manager.select_track("Z", "A").await,
        Err(hangar_status::ManagerError::UnknownAddon(_))
    ));

    let events = recorder.0.lock().unwrap().clone();
    assert_eq!(events.len(), 2);
    assert!(events[1].ends_with("->B"));
}

#[tokio::test]
async fn test_latest_version_uses_selected_track() {
    let cdn_addon = Addon {
        key: "C".to_string(),
        repo_name: "c".to_string(),
        target_directory: "c".to_string(),
        hidden: false,
        tracks: vec![
            track("A", &[]),
            AddonTrack {
                url: "https://cdn.example.com/addons/c".to_string(),
                alternative_urls: vec![],
                release_model: ReleaseModel::Cdn { url: None },
            },
        ],
    };
    let manager = AddonManager::new(
        Catalog {
            addons: vec![cdn_addon],
        },
        "/community",
        SettingsStore::in_memory(),
        Arc::new(FakeInspector::new()),
        ReleaseResolver::new(
            Arc::new(NoGithub),
            Arc::new(StaticCdn("releases:\n  - name: \"1.2.3\"\n    date: 2024-01-01\n")),
        ),
    );

    // default track is a GitHub release track without releases
    assert!(matches!(
        manager.latest_version("C", None).await,
        Err(hangar_status::ManagerError::Resolve(ResolveError::NotFound(_)))
    ));

    manager
        .select_track("C", "https://cdn.example.com/addons/c")
        .await
        .unwrap();
    let release = manager.latest_version("C", None).await.unwrap();
    assert_eq!(release.name, "1.2.3");
    assert_eq!(release.release_date.to_rfc3339(), "2024-01-01T00:00:00+00:00");

    let info = manager.tracker().get_status("C").await.unwrap();
    assert_eq!(info.latest_version, Some(release));
}

#[tokio::test]
async fn test_stale_persisted_tracks_are_replaced_by_the_pass() {
    let cdn_addon = Addon {
        key: "Y".to_string(),
        repo_name: "y".to_string(),
        target_directory: "y".to_string(),
        hidden: false,
        tracks: vec![
            track("A", &[]),
            AddonTrack {
                url: "B".to_string(),
                alternative_urls: vec![],
                release_model: ReleaseModel::Cdn { url: None },
            },
        ],
    };
    let store = SettingsStore::in_memory();
    store.set("selectedTracks.Y", &"removed-track").await.unwrap();
    store.set("installedTracks.Y", &"removed-track").await.unwrap();
    let manager = AddonManager::new(
        Catalog {
            addons: vec![cdn_addon.clone()],
        },
        "/community",
        store.clone(),
        Arc::new(FakeInspector::new().managed("B")),
        ReleaseResolver::new(
            Arc::new(NoGithub),
            Arc::new(StaticCdn("releases:\n  - name: \"9.9.9\"\n    date: 2024-02-01\n")),
        ),
    );

    let outcome = manager.configure_initial_state(&cdn_addon).await;
    assert_eq!(outcome.selection.selected.unwrap().url, "B");
    assert_eq!(outcome.selection.installed.unwrap().url, "B");
    assert_eq!(
        store.get::<String>("selectedTracks.Y").await.unwrap(),
        Some("B".to_string())
    );
    assert_eq!(
        store.get::<String>("installedTracks.Y").await.unwrap(),
        Some("B".to_string())
    );

    // the selected track, not tracks[0], answers an implicit lookup
    let release = manager.latest_version("Y", None).await.unwrap();
    assert_eq!(release.name, "9.9.9");
}

#[tokio::test]
async fn test_filesystem_pass_against_real_directories() {
    let community = tempfile::tempdir().unwrap();
    let git_addon = addon("G", false, vec![track("A", &[])]);
    let absent_addon = addon_x();
    std::fs::create_dir_all(community.path().join("g").join(".git")).unwrap();

    let manager = AddonManager::new(
        Catalog {
            addons: vec![git_addon, absent_addon],
        },
        community.path(),
        SettingsStore::in_memory(),
        Arc::new(FsInstallInspector::new()),
        ReleaseResolver::default(),
    );

    let outcomes = manager.configure_all().await;
    assert_eq!(outcomes[0].status, InstallStatus::GitInstall);
    assert_eq!(outcomes[1].status, InstallStatus::FreshInstall);
}
