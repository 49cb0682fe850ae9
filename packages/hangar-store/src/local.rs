use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::{SettingsBackend, StoreResult};

/// Backend persisting every key into a single JSON object file.
///
/// The file is read on first access and rewritten on every mutation.
pub struct JsonFileBackend {
    path: PathBuf,
    data: RwLock<Option<Map<String, Value>>>,
}

impl JsonFileBackend {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            data: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Map<String, Value>> {
        match tokio::fs::read(&self.path).await {
            Ok(content) if content.is_empty() => Ok(Map::new()),
            Ok(content) => {
                let data: Map<String, Value> = serde_json::from_slice(&content)?;
                tracing::debug!(path = %self.path.display(), keys = data.len(), "loaded settings");
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file yet");
                Ok(Map::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, data: &Map<String, Value>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Runs `f` on a copy of the loaded map under the write lock. The cache
    /// only takes the copy once it is saved.
    async fn mutate<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Map<String, Value>) + Send,
    {
        let mut guard = self.data.write().await;
        let mut data = match guard.as_ref() {
            Some(data) => data.clone(),
            None => self.load().await?,
        };
        f(&mut data);
        self.save(&data).await?;
        *guard = Some(data);
        Ok(())
    }
}

#[async_trait]
impl SettingsBackend for JsonFileBackend {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        {
            let guard = self.data.read().await;
            if let Some(data) = guard.as_ref() {
                return Ok(data.get(key).cloned());
            }
        }
        let mut guard = self.data.write().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|data| data.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let key = key.to_string();
        self.mutate(move |data| {
            data.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.mutate(|data| {
            data.remove(key);
        })
        .await
    }

    async fn clear(&self) -> StoreResult<()> {
        self.mutate(|data| data.clear()).await
    }
}
