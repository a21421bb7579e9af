//! In-memory cache storage

use crate::cache::{CacheKey, CacheStorage};
use crate::error::ShellCacheResult;
use crate::http::Response;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Named caches held in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    caches: RwLock<BTreeMap<String, BTreeMap<CacheKey, Response>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn names(&self) -> ShellCacheResult<Vec<String>> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn open(&self, name: &str) -> ShellCacheResult<()> {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn delete(&self, name: &str) -> ShellCacheResult<bool> {
        Ok(self.caches.write().await.remove(name).is_some())
    }

    async fn get(&self, name: &str, key: &CacheKey) -> ShellCacheResult<Option<Response>> {
        Ok(self
            .caches
            .read()
            .await
            .get(name)
            .and_then(|cache| cache.get(key))
            .cloned())
    }

    async fn put(&self, name: &str, key: &CacheKey, response: &Response) -> ShellCacheResult<()> {
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key.clone(), response.clone());
        Ok(())
    }

    async fn keys(&self, name: &str) -> ShellCacheResult<Vec<CacheKey>> {
        Ok(self
            .caches
            .read()
            .await
            .get(name)
            .map(|cache| cache.keys().cloned().collect())
            .unwrap_or_default())
    }
}
