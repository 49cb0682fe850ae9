pub mod concurrent;
pub mod keys;
pub mod local;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub use concurrent::MemoryBackend;
pub use local::JsonFileBackend;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings value could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw key-value persistence.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;
    async fn remove(&self, key: &str) -> StoreResult<()>;
    async fn clear(&self) -> StoreResult<()>;
}

/// Typed handle over a [`SettingsBackend`].
///
/// Cloning shares the backend.
#[derive(Clone)]
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.backend.get(key).await? {
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.backend.set(key, serde_json::to_value(value)?).await
    }

    /// Idempotent upsert: writes only when nothing is stored under `key`.
    ///
    /// Returns whether the value was written.
    pub async fn set_if_absent<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<bool> {
        self.set_unless(key, value, |_: &Value| true).await
    }

    /// Writes unless a value is present and `keep_existing` returns true for it.
    ///
    /// Returns whether the value was written.
    pub async fn set_unless<T, F>(&self, key: &str, value: &T, keep_existing: F) -> StoreResult<bool>
    where
        T: Serialize,
        F: FnOnce(&Value) -> bool + Send,
    {
        if let Some(existing) = self.backend.get(key).await? {
            if !existing.is_null() && keep_existing(&existing) {
                return Ok(false);
            }
        }
        self.set(key, value).await?;
        Ok(true)
    }

    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        self.backend.remove(key).await
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.backend.clear().await
    }
}
