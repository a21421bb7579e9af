//! Cache worker lifecycle
//!
//! A [`CacheWorker`] owns one version of the application's caches. It is
//! installed (precaching the asset manifest), activated (purging caches of
//! older versions and claiming clients), and from then on handles fetches
//! until a newer worker replaces it.

use crate::cache::{AssetManifest, CacheKey, CacheNames, CacheStorage, ManifestEntry};
use crate::config::{Config, NotificationConfig};
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::request::resolve_url;
use crate::http::{Fetcher, Request, Response};
use crate::worker::clients::Clients;
use crate::worker::messages::{ControlMessage, ControlReply};
use crate::worker::routing::Router;
use crate::worker::state::WorkerState;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything a worker derives from configuration
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub names: CacheNames,
    pub manifest: AssetManifest,
    pub router: Router,
    /// Absolute URL of the cached application shell document
    pub shell_url: String,
    /// Absolute URL of the application root; windows under it belong to the app
    pub app_root: String,
    pub notifications: NotificationConfig,
    pub skip_waiting: bool,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> ShellCacheResult<Self> {
        let origin = &config.network.origin;
        Ok(Self {
            names: CacheNames::from_config(&config.cache),
            manifest: AssetManifest::from_config(config),
            router: Router::from_config(config)?,
            shell_url: resolve_url(origin, &config.cache.shell_document),
            app_root: resolve_url(origin, "/"),
            notifications: config.notifications.clone(),
            skip_waiting: config.worker.skip_waiting,
        })
    }

    /// Same settings bound to a different cache version
    pub fn with_version(mut self, version: &str) -> Self {
        self.names = CacheNames::new(self.names.namespace(), version);
        self
    }
}

/// Outcome of a successful install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// URLs stored in the static cache
    pub cached: Vec<String>,
    /// Optional URLs that could not be fetched
    pub skipped: Vec<String>,
}

/// Outcome of activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Caches of older versions that were deleted
    pub deleted: Vec<String>,
}

/// One versioned instance of the offline cache manager
pub struct CacheWorker {
    pub(crate) settings: WorkerSettings,
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) clients: Arc<dyn Clients>,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
    pub(crate) refreshes: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for CacheWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheWorker")
            .field("version", &self.version())
            .field("state", &self.state())
            .field("fetcher", &self.fetcher.name())
            .finish()
    }
}

impl CacheWorker {
    /// Create a worker in the `installing` state
    pub fn new(
        settings: WorkerSettings,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn Clients>,
    ) -> Self {
        Self::restore(settings, storage, fetcher, clients, WorkerState::Installing)
    }

    /// Recreate a worker that already reached `state` in an earlier run
    pub fn restore(
        settings: WorkerSettings,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn Clients>,
        state: WorkerState,
    ) -> Self {
        Self {
            settings,
            storage,
            fetcher,
            clients,
            state: Mutex::new(state),
            skip_waiting: AtomicBool::new(false),
            refreshes: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> WorkerState {
        *lock(&self.state)
    }

    /// Version tag reported to the application, e.g. `hmp-v1`
    pub fn version(&self) -> String {
        self.settings.names.version_tag()
    }

    pub fn names(&self) -> &CacheNames {
        &self.settings.names
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    fn transition(&self, next: WorkerState) -> ShellCacheResult<()> {
        let mut state = lock(&self.state);
        if !state.can_transition_to(next) {
            return Err(ShellCacheError::InvalidTransition {
                from: state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(version = %self.settings.names.version_tag(), from = %*state, to = %next, "worker state change");
        *state = next;
        Ok(())
    }

    /// Retire this worker; a no-op if it already is redundant
    pub fn mark_redundant(&self) {
        let mut state = lock(&self.state);
        if !state.is_terminal() {
            info!(version = %self.settings.names.version_tag(), from = %*state, "worker redundant");
            *state = WorkerState::Redundant;
        }
    }

    /// Ask to activate as soon as installation finishes
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Precache the asset manifest into the static cache
    ///
    /// Every required entry must fetch with a 2xx status or the worker turns
    /// redundant and nothing is stored from the required set. Optional
    /// entries that fail are logged and skipped.
    pub async fn install(&self) -> ShellCacheResult<InstallReport> {
        let state = self.state();
        if state != WorkerState::Installing {
            return Err(ShellCacheError::InvalidTransition {
                from: state.to_string(),
                to: WorkerState::Installed.to_string(),
            });
        }
        let static_name = self.settings.names.static_name();
        info!(version = %self.version(), cache = %static_name, "installing");

        match self.precache(&static_name).await {
            Ok(report) => {
                self.transition(WorkerState::Installed)?;
                if self.settings.skip_waiting {
                    self.skip_waiting();
                }
                info!(
                    cached = report.cached.len(),
                    skipped = report.skipped.len(),
                    "install complete"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "install failed");
                self.mark_redundant();
                Err(e)
            }
        }
    }

    async fn precache(&self, cache: &str) -> ShellCacheResult<InstallReport> {
        let required: Vec<&ManifestEntry> = self.settings.manifest.required().collect();
        let fetched = join_all(required.iter().map(|entry| self.fetch_entry(entry))).await;
        let mut ready = Vec::with_capacity(fetched.len());
        for (entry, result) in required.iter().zip(fetched) {
            let response = result.map_err(|reason| ShellCacheError::InstallFailed {
                url: entry.url.clone(),
                reason,
            })?;
            ready.push((entry, response));
        }

        // Only create the cache once every required asset is in hand
        self.storage.open(cache).await?;

        let mut report = InstallReport::default();
        for (entry, response) in ready {
            let key = CacheKey::from_url(&entry.url)?;
            self.storage.put(cache, &key, &response).await?;
            report.cached.push(entry.url.clone());
        }

        let optional: Vec<&ManifestEntry> = self.settings.manifest.optional().collect();
        let fetched = join_all(optional.iter().map(|entry| self.fetch_entry(entry))).await;
        for (entry, result) in optional.iter().zip(fetched) {
            let stored = match result {
                Ok(response) => match CacheKey::from_url(&entry.url) {
                    Ok(key) => self
                        .storage
                        .put(cache, &key, &response)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                },
                Err(reason) => Err(reason),
            };
            match stored {
                Ok(()) => report.cached.push(entry.url.clone()),
                Err(reason) => {
                    warn!(url = %entry.url, %reason, "skipping optional asset");
                    report.skipped.push(entry.url.clone());
                }
            }
        }

        Ok(report)
    }

    /// Fetch one manifest entry, turning non-2xx into a failure reason
    async fn fetch_entry(&self, entry: &ManifestEntry) -> Result<Response, String> {
        let response = self
            .fetcher
            .fetch(&Request::get(&entry.url))
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_ok() {
            return Err(format!("HTTP {} {}", response.status, response.status_text));
        }
        debug!(url = %entry.url, bytes = response.body.len(), "precached");
        Ok(response)
    }

    /// Purge caches of older versions and take control of clients
    ///
    /// Deletion and claim failures are logged; activation still completes.
    pub async fn activate(&self) -> ShellCacheResult<ActivateReport> {
        self.transition(WorkerState::Activating)?;
        info!(version = %self.version(), "activating");

        let mut report = ActivateReport::default();
        match self.storage.names().await {
            Ok(names) => {
                for name in self.settings.names.stale(&names) {
                    match self.storage.delete(name).await {
                        Ok(_) => {
                            info!(cache = %name, "deleted old cache");
                            report.deleted.push(name.clone());
                        }
                        Err(e) => warn!(cache = %name, error = %e, "failed to delete old cache"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "failed to list caches"),
        }

        if let Err(e) = self.clients.claim().await {
            warn!(error = %e, "failed to claim clients");
        }

        self.transition(WorkerState::Activated)?;
        Ok(report)
    }

    /// Delete every cache in this application's namespace
    pub async fn clear_caches(&self) -> ShellCacheResult<Vec<String>> {
        let mut deleted = vec![];
        for name in self.storage.names().await? {
            if self.settings.names.in_namespace(&name) && self.storage.delete(&name).await? {
                deleted.push(name);
            }
        }
        info!(count = deleted.len(), "cleared caches");
        Ok(deleted)
    }

    /// Handle a control message, replying on `reply` when given
    pub async fn handle_message(
        &self,
        message: ControlMessage,
        reply: Option<oneshot::Sender<ControlReply>>,
    ) -> ShellCacheResult<()> {
        debug!(%message, "control message");
        let (outcome, answer) = match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting();
                (Ok(()), ControlReply::Done { success: true })
            }
            ControlMessage::GetVersion => (
                Ok(()),
                ControlReply::Version {
                    version: self.version(),
                },
            ),
            ControlMessage::ClearCache => match self.clear_caches().await {
                Ok(_) => (Ok(()), ControlReply::Done { success: true }),
                Err(e) => (Err(e), ControlReply::Done { success: false }),
            },
        };

        if let Some(reply) = reply {
            // The page may have stopped listening; that is not an error
            let _ = reply.send(answer);
        }
        outcome
    }

    /// Wait for every background refresh started so far
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *lock(&self.refreshes));
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "background refresh task failed");
            }
        }
    }
}

/// Lock a mutex, recovering the data if a holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
