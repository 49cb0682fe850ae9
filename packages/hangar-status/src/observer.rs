use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use hangar_provider::ReleaseInfo;

use crate::install_status::InstallStatus;

/// Receives resolution results, e.g. to refresh a UI.
#[async_trait]
pub trait AddonObserver: Send + Sync {
    /// Called exactly once per resolution pass
    async fn on_status_resolved(&self, addon_key: &str, status: InstallStatus);

    async fn on_track_selected(&self, addon_key: &str, track_url: &str);

    async fn on_latest_version(&self, addon_key: &str, release: &ReleaseInfo);
}

#[derive(Clone, Default)]
pub struct ObserverManager {
    observers: Arc<Mutex<Vec<Arc<dyn AddonObserver>>>>,
}

impl ObserverManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, observer: Arc<dyn AddonObserver>) {
        let mut observers = self.observers.lock().await;
        observers.push(observer);
    }

    pub async fn clear(&self) {
        let mut observers = self.observers.lock().await;
        observers.clear();
    }

    pub async fn observer_count(&self) -> usize {
        let observers = self.observers.lock().await;
        observers.len()
    }

    // Observers are cloned out of the lock so a slow observer does not block registration.
    async fn snapshot(&self) -> Vec<Arc<dyn AddonObserver>> {
        self.observers.lock().await.clone()
    }

    pub async fn notify_status_resolved(&self, addon_key: &str, status: InstallStatus) {
        for observer in self.snapshot().await {
            observer.on_status_resolved(addon_key, status).await;
        }
    }

    pub async fn notify_track_selected(&self, addon_key: &str, track_url: &str) {
        for observer in self.snapshot().await {
            observer.on_track_selected(addon_key, track_url).await;
        }
    }

    pub async fn notify_latest_version(&self, addon_key: &str, release: &ReleaseInfo) {
        for observer in self.snapshot().await {
            observer.on_latest_version(addon_key, release).await;
        }
    }
}
