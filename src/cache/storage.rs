//! Cache storage abstraction
//!
//! Provides a trait over a set of named caches so the worker can run on an
//! in-memory store (tests, embedding) or the persistent disk store (CLI).

use crate::cache::CacheKey;
use crate::error::ShellCacheResult;
use crate::http::Response;
use async_trait::async_trait;

/// Abstract store of named caches
///
/// Writes to the same key are last-writer-wins; implementations need no
/// ordering beyond that.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of every persisted cache, sorted
    async fn names(&self) -> ShellCacheResult<Vec<String>>;

    /// Create the cache if it does not exist
    async fn open(&self, name: &str) -> ShellCacheResult<()>;

    /// Delete a cache; returns whether it existed
    async fn delete(&self, name: &str) -> ShellCacheResult<bool>;

    /// Look up an entry by exact key
    async fn get(&self, name: &str, key: &CacheKey) -> ShellCacheResult<Option<Response>>;

    /// Store (or overwrite) an entry, creating the cache if needed
    async fn put(&self, name: &str, key: &CacheKey, response: &Response) -> ShellCacheResult<()>;

    /// Keys held by a cache (empty if the cache does not exist)
    async fn keys(&self, name: &str) -> ShellCacheResult<Vec<CacheKey>>;

    /// Whether a cache exists
    async fn has(&self, name: &str) -> ShellCacheResult<bool> {
        Ok(self.names().await?.iter().any(|n| n == name))
    }
}
