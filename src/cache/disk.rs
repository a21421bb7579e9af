//! Persistent cache storage on the local filesystem
//!
//! Layout: one directory per cache, one `<digest>.entry` file per entry
//! named by the key digest. The file is a single line of JSON metadata, a
//! newline, then the raw body. Entries are published with one rename, so a
//! reader sees either the previous entry or the new one, never a mix.

use crate::cache::{CacheKey, CacheStorage};
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::debug;

/// Distinguishes temp files of concurrent writers to the same entry
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

const ENTRY_EXT: &str = "entry";

/// Metadata line at the head of each entry file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    key: CacheKey,
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    stored_at: DateTime<Utc>,
}

/// Named caches persisted under a root directory
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> ShellCacheResult<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.starts_with('.');
        if !valid {
            return Err(ShellCacheError::Storage(format!(
                "invalid cache name '{}'",
                name
            )));
        }
        Ok(self.root.join(name))
    }

    fn entry_path(dir: &Path, key: &CacheKey) -> PathBuf {
        dir.join(format!("{}.{}", key.digest(), ENTRY_EXT))
    }

    fn encode_entry(meta: &EntryMeta, body: &[u8]) -> ShellCacheResult<Vec<u8>> {
        // Compact JSON escapes newlines, so the first '\n' ends the header
        let header = serde_json::to_vec(meta)?;
        let mut contents = Vec::with_capacity(header.len() + 1 + body.len());
        contents.extend_from_slice(&header);
        contents.push(b'\n');
        contents.extend_from_slice(body);
        Ok(contents)
    }

    fn decode_entry(path: &Path, mut contents: Vec<u8>) -> ShellCacheResult<(EntryMeta, Vec<u8>)> {
        let split = contents.iter().position(|&b| b == b'\n').ok_or_else(|| {
            ShellCacheError::Storage(format!("corrupt cache entry {}", path.display()))
        })?;
        let body = contents.split_off(split + 1);
        let meta = serde_json::from_slice(&contents[..split])?;
        Ok((meta, body))
    }

    /// Read one entry file; `None` when it does not exist
    async fn read_entry(path: &Path) -> ShellCacheResult<Option<(EntryMeta, Vec<u8>)>> {
        match fs::read(path).await {
            Ok(contents) => Self::decode_entry(path, contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShellCacheError::io(format!("reading {}", path.display()), e)),
        }
    }
}

/// Write through a uniquely named temp file and rename over `path`
///
/// Readers see the old contents or the new ones, never a partial file.
/// Concurrent writers to the same path each publish a whole file; the last
/// rename wins.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> ShellCacheResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("entry");
    let tmp = path.with_file_name(format!(
        "{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&tmp, contents)
        .await
        .map_err(|e| ShellCacheError::io(format!("writing {}", tmp.display()), e))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        fs::remove_file(&tmp).await.ok();
        return Err(ShellCacheError::io(
            format!("renaming into {}", path.display()),
            e,
        ));
    }
    Ok(())
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn names(&self) -> ShellCacheResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut names = vec![];
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ShellCacheError::io("reading cache storage directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShellCacheError::io("reading cache storage entry", e))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn open(&self, name: &str) -> ShellCacheResult<()> {
        let dir = self.cache_dir(name)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ShellCacheError::io(format!("creating cache {}", name), e))
    }

    async fn delete(&self, name: &str) -> ShellCacheResult<bool> {
        let dir = self.cache_dir(name)?;
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| ShellCacheError::io(format!("deleting cache {}", name), e))?;
        debug!(cache = name, "deleted cache directory");
        Ok(true)
    }

    async fn get(&self, name: &str, key: &CacheKey) -> ShellCacheResult<Option<Response>> {
        let dir = self.cache_dir(name)?;
        let path = Self::entry_path(&dir, key);

        let Some((meta, body)) = Self::read_entry(&path).await? else {
            return Ok(None);
        };
        // Digest collisions are not expected, but never serve a foreign entry
        if &meta.key != key {
            return Ok(None);
        }

        Ok(Some(Response {
            status: meta.status,
            status_text: meta.status_text,
            headers: meta.headers,
            body,
        }))
    }

    async fn put(&self, name: &str, key: &CacheKey, response: &Response) -> ShellCacheResult<()> {
        self.open(name).await?;
        let dir = self.cache_dir(name)?;
        let path = Self::entry_path(&dir, key);

        let meta = EntryMeta {
            key: key.clone(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            stored_at: Utc::now(),
        };

        write_atomic(&path, &Self::encode_entry(&meta, &response.body)?).await
    }

    async fn keys(&self, name: &str) -> ShellCacheResult<Vec<CacheKey>> {
        let dir = self.cache_dir(name)?;
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut keys = vec![];
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| ShellCacheError::io(format!("reading cache {}", name), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShellCacheError::io(format!("reading cache {} entry", name), e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXT) {
                match Self::read_entry(&path).await {
                    Ok(Some((meta, _))) => keys.push(meta.key),
                    Ok(None) => {}
                    Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable entry"),
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn has(&self, name: &str) -> ShellCacheResult<bool> {
        Ok(self.cache_dir(name)?.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (DiskStorage, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let storage = DiskStorage::new(temp_dir.path().join("caches"));
        (storage, temp_dir)
    }

    fn key(url: &str) -> CacheKey {
        CacheKey::from_url(url).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_preserves_snapshot() {
        let (storage, _temp) = create_test_storage();
        let k = key("https://app.example/css/styles.css");
        let response = Response::new(200, "body { margin: 0 }")
            .with_header("Content-Type", "text/css");

        storage.put("hmp-static-v1", &k, &response).await.unwrap();

        let hit = storage.get("hmp-static-v1", &k).await.unwrap().unwrap();
        assert_eq!(hit, response);
    }

    #[tokio::test]
    async fn overwrite_keeps_latest() {
        let (storage, _temp) = create_test_storage();
        let k = key("https://app.example/api/characters");

        storage.put("c", &k, &Response::new(200, "old")).await.unwrap();
        storage.put("c", &k, &Response::new(200, "new")).await.unwrap();

        assert_eq!(storage.get("c", &k).await.unwrap().unwrap().text(), "new");
        assert_eq!(storage.keys("c").await.unwrap(), vec![k]);
    }

    #[tokio::test]
    async fn missing_cache_and_entry() {
        let (storage, _temp) = create_test_storage();
        let k = key("https://app.example/");
        assert!(storage.names().await.unwrap().is_empty());
        assert!(storage.get("absent", &k).await.unwrap().is_none());
        assert!(!storage.has("absent").await.unwrap());
        assert!(!storage.delete("absent").await.unwrap());
    }

    #[tokio::test]
    async fn names_and_delete() {
        let (storage, _temp) = create_test_storage();
        storage.open("hmp-static-v1").await.unwrap();
        storage.open("hmp-dynamic-v1").await.unwrap();

        assert_eq!(
            storage.names().await.unwrap(),
            vec!["hmp-dynamic-v1", "hmp-static-v1"]
        );

        assert!(storage.delete("hmp-static-v1").await.unwrap());
        assert_eq!(storage.names().await.unwrap(), vec!["hmp-dynamic-v1"]);
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.open("../escape").await.is_err());
        assert!(storage.open("").await.is_err());
        assert!(storage.open(".hidden").await.is_err());
    }

    #[tokio::test]
    async fn leftover_temp_files_are_ignored() {
        let (storage, _temp) = create_test_storage();
        let k = key("https://app.example/js/app.js");
        storage.open("c").await.unwrap();
        let dir = storage.root().join("c");
        std::fs::write(dir.join(format!("{}.entry.1.0.tmp", k.digest())), "partial").unwrap();

        assert!(storage.get("c", &k).await.unwrap().is_none());
        assert!(storage.keys("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn binary_body_with_newlines_survives() {
        let (storage, _temp) = create_test_storage();
        let k = key("https://app.example/img/logo.png");
        let response = Response::new(200, vec![0x89, b'P', b'N', b'G', b'\n', 0, b'\n'])
            .with_header("Content-Type", "image/png");

        storage.put("c", &k, &response).await.unwrap();

        assert_eq!(storage.get("c", &k).await.unwrap().unwrap(), response);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_never_mix_entries() {
        let (storage, _temp) = create_test_storage();
        let storage = std::sync::Arc::new(storage);
        let k = key("https://app.example/api/looks");
        let a = Response::new(200, "A".repeat(64 * 1024)).with_header("X-Src", "A");
        let b = Response::new(201, "B".repeat(32 * 1024)).with_header("X-Src", "B");

        for _ in 0..100 {
            let (s1, k1, r1) = (storage.clone(), k.clone(), a.clone());
            let (s2, k2, r2) = (storage.clone(), k.clone(), b.clone());
            let first = tokio::spawn(async move { s1.put("c", &k1, &r1).await });
            let second = tokio::spawn(async move { s2.put("c", &k2, &r2).await });
            first.await.unwrap().unwrap();
            second.await.unwrap().unwrap();

            let stored = storage.get("c", &k).await.unwrap().unwrap();
            assert!(stored == a || stored == b, "entry mixes two responses");
        }
        assert_eq!(storage.keys("c").await.unwrap(), vec![k]);
    }
}
