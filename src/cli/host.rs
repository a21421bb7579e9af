//! Command-line host for the cache worker
//!
//! Every invocation rebuilds the registration from the persisted record,
//! runs one lifecycle event against it, and saves the record again.

use crate::cache::DiskStorage;
use crate::config::{Config, ConfigManager};
use crate::error::ShellCacheResult;
use crate::http::HttpFetcher;
use crate::worker::{
    CacheWorker, HeadlessClients, Registration, RegistrationRecord, WorkerRecord, WorkerSettings,
    WorkerState,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Disk storage, ureq fetcher and headless clients wired from config
pub struct Host {
    config: Config,
    storage: Arc<DiskStorage>,
    fetcher: Arc<HttpFetcher>,
    clients: Arc<HeadlessClients>,
    record_path: PathBuf,
}

impl Host {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            storage: Arc::new(DiskStorage::new(ConfigManager::storage_dir(config))),
            fetcher: Arc::new(HttpFetcher::new(&config.network)),
            clients: Arc::new(HeadlessClients::new()),
            record_path: ConfigManager::registration_path(config),
        }
    }

    pub fn storage(&self) -> &Arc<DiskStorage> {
        &self.storage
    }

    pub fn record_path(&self) -> &PathBuf {
        &self.record_path
    }

    /// Worker settings for the configured version
    pub fn settings(&self) -> ShellCacheResult<WorkerSettings> {
        WorkerSettings::from_config(&self.config)
    }

    /// A fresh worker, ready to install
    pub fn new_worker(&self, settings: WorkerSettings) -> CacheWorker {
        CacheWorker::new(
            settings,
            self.storage.clone(),
            self.fetcher.clone(),
            self.clients.clone(),
        )
    }

    fn restore(&self, record: &WorkerRecord) -> ShellCacheResult<CacheWorker> {
        let settings = self.settings()?.with_version(&record.cache_version);
        Ok(CacheWorker::restore(
            settings,
            self.storage.clone(),
            self.fetcher.clone(),
            self.clients.clone(),
            record.state,
        ))
    }

    /// The persisted record, or an empty one on first use
    pub async fn load_record(&self) -> ShellCacheResult<RegistrationRecord> {
        Ok(RegistrationRecord::load(&self.record_path)
            .await?
            .unwrap_or_default())
    }

    /// Rebuild the registration from the persisted record
    pub async fn registration(&self) -> ShellCacheResult<Registration> {
        let record = self.load_record().await?;
        let mut registration = Registration::new(self.fetcher.clone());

        if let Some(active) = record.active.as_ref().filter(|r| r.state != WorkerState::Redundant) {
            debug!(version = %active.version, "restoring active worker");
            registration = registration.with_active(self.restore(active)?, active.since);
        }
        if let Some(waiting) = record.waiting.as_ref().filter(|r| r.state.is_waiting()) {
            debug!(version = %waiting.version, "restoring waiting worker");
            registration = registration.with_waiting(self.restore(waiting)?, waiting.since);
        }

        Ok(registration)
    }

    /// Wait for background work, then save the registration record
    pub async fn persist(&self, registration: &Registration) -> ShellCacheResult<()> {
        registration.settle().await;
        registration.record().save(&self.record_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn host() -> (Host, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.general.state_dir = Some(temp.path().join("state"));
        config.cache.storage_dir = Some(temp.path().join("caches"));
        (Host::new(&config), temp)
    }

    fn worker_record(cache_version: &str, state: WorkerState) -> WorkerRecord {
        WorkerRecord {
            version: format!("hmp-{cache_version}"),
            cache_version: cache_version.to_string(),
            state,
            since: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_registration_on_first_use() {
        let (host, _temp) = host();
        let registration = host.registration().await.unwrap();
        assert!(registration.active().is_none());
        assert!(registration.waiting().is_none());
    }

    #[tokio::test]
    async fn restores_workers_with_recorded_versions() {
        let (host, _temp) = host();
        let record = RegistrationRecord {
            active: Some(worker_record("v0", WorkerState::Activated)),
            waiting: Some(worker_record("v1", WorkerState::Installed)),
            updated_at: Some(Utc::now()),
        };
        record.save(host.record_path()).await.unwrap();

        let registration = host.registration().await.unwrap();

        let active = registration.active().unwrap();
        assert_eq!(active.version(), "hmp-v0");
        assert_eq!(active.names().static_name(), "hmp-static-v0");
        assert_eq!(active.state(), WorkerState::Activated);
        assert_eq!(registration.waiting().unwrap().version(), "hmp-v1");
    }

    #[tokio::test]
    async fn persist_writes_current_record() {
        let (host, _temp) = host();
        let record = RegistrationRecord {
            active: Some(worker_record("v1", WorkerState::Activated)),
            waiting: None,
            updated_at: None,
        };
        record.save(host.record_path()).await.unwrap();

        let registration = host.registration().await.unwrap();
        host.persist(&registration).await.unwrap();

        let saved = host.load_record().await.unwrap();
        assert_eq!(saved.active, record.active);
        assert!(saved.updated_at.is_some());
    }
}
