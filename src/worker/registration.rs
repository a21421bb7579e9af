//! Registration: which worker is active and which one is waiting
//!
//! A registration owns at most one active and one waiting worker. Installing
//! a new worker supersedes any waiting one once its install succeeds; promoting the waiting worker
//! retires the active one. The bookkeeping persists as JSON so that separate
//! host processes see the same lifecycle.

use crate::cache::disk::write_atomic;
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::{Fetcher, Request, Response};
use crate::worker::manager::{ActivateReport, CacheWorker, InstallReport};
use crate::worker::messages::{ControlMessage, ControlReply};
use crate::worker::state::WorkerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Persisted view of one worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    /// Version tag, e.g. `hmp-v1`
    pub version: String,
    /// Bare cache version, e.g. `v1`
    pub cache_version: String,
    pub state: WorkerState,
    /// When the worker entered its current slot
    pub since: DateTime<Utc>,
}

/// Persisted registration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub active: Option<WorkerRecord>,
    pub waiting: Option<WorkerRecord>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RegistrationRecord {
    /// Load the record, if one was saved
    pub async fn load(path: &Path) -> ShellCacheResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            ShellCacheError::io(format!("reading registration {}", path.display()), e)
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub async fn save(&self, path: &Path) -> ShellCacheResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ShellCacheError::io("creating state directory", e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        write_atomic(path, content.as_bytes()).await
    }
}

#[derive(Debug, Clone)]
struct Slot {
    worker: Arc<CacheWorker>,
    since: DateTime<Utc>,
}

impl Slot {
    fn new(worker: Arc<CacheWorker>) -> Self {
        Self {
            worker,
            since: Utc::now(),
        }
    }

    fn record(&self) -> WorkerRecord {
        WorkerRecord {
            version: self.worker.version(),
            cache_version: self.worker.names().version().to_string(),
            state: self.worker.state(),
            since: self.since,
        }
    }
}

/// Result of installing through the registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub report: InstallReport,
    /// Set when the new worker was activated right away
    pub activated: Option<ActivateReport>,
}

/// Active and waiting workers for one application scope
pub struct Registration {
    fetcher: Arc<dyn Fetcher>,
    active: Option<Slot>,
    waiting: Option<Slot>,
}

impl Registration {
    /// Empty registration; requests pass straight to `fetcher`
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            active: None,
            waiting: None,
        }
    }

    /// Restore an already-active worker
    pub fn with_active(mut self, worker: CacheWorker, since: DateTime<Utc>) -> Self {
        self.active = Some(Slot {
            worker: Arc::new(worker),
            since,
        });
        self
    }

    /// Restore an installed worker that is waiting to activate
    pub fn with_waiting(mut self, worker: CacheWorker, since: DateTime<Utc>) -> Self {
        self.waiting = Some(Slot {
            worker: Arc::new(worker),
            since,
        });
        self
    }

    pub fn active(&self) -> Option<&Arc<CacheWorker>> {
        self.active.as_ref().map(|slot| &slot.worker)
    }

    pub fn waiting(&self) -> Option<&Arc<CacheWorker>> {
        self.waiting.as_ref().map(|slot| &slot.worker)
    }

    /// Install a new worker
    ///
    /// Once the install succeeds, a previously waiting worker becomes
    /// redundant. The new worker is activated immediately when nothing is
    /// active yet or when it asked to skip waiting; otherwise it waits. A
    /// failed install leaves both slots untouched.
    pub async fn install(&mut self, worker: CacheWorker) -> ShellCacheResult<InstallOutcome> {
        let worker = Arc::new(worker);
        let report = worker.install().await?;

        if let Some(previous) = self.waiting.take() {
            info!(version = %previous.worker.version(), "superseding waiting worker");
            previous.worker.mark_redundant();
        }

        let slot = Slot::new(worker);
        let activate_now = self.active.is_none() || slot.worker.skip_waiting_requested();
        if activate_now {
            let activated = self.promote(slot).await?;
            Ok(InstallOutcome {
                report,
                activated: Some(activated),
            })
        } else {
            info!(version = %slot.worker.version(), "installed, waiting to activate");
            self.waiting = Some(slot);
            Ok(InstallOutcome {
                report,
                activated: None,
            })
        }
    }

    /// Activate the waiting worker now
    pub async fn skip_waiting(&mut self) -> ShellCacheResult<ActivateReport> {
        let slot = self.waiting.take().ok_or(ShellCacheError::NothingWaiting)?;
        slot.worker.skip_waiting();
        self.promote(slot).await
    }

    async fn promote(&mut self, slot: Slot) -> ShellCacheResult<ActivateReport> {
        if let Some(old) = self.active.take() {
            old.worker.settle().await;
            old.worker.mark_redundant();
        }

        let report = slot.worker.activate().await?;
        info!(version = %slot.worker.version(), deleted = report.deleted.len(), "worker active");
        self.active = Some(Slot::new(slot.worker));
        Ok(report)
    }

    /// Route a request through the active worker, or straight to the network
    pub async fn handle_fetch(&self, request: &Request) -> ShellCacheResult<Response> {
        match self.active() {
            Some(worker) => worker.handle_fetch(request).await,
            None => {
                debug!(url = %request.url, "no active worker, passing through");
                self.fetcher.fetch(request).await
            }
        }
    }

    /// Post a control message and wait for the reply
    ///
    /// `SKIP_WAITING` goes to the waiting worker and promotes it; the other
    /// messages go to the active worker, or the waiting one if none is active.
    pub async fn post_message(&mut self, message: ControlMessage) -> ShellCacheResult<ControlReply> {
        let target = match message {
            ControlMessage::SkipWaiting => self.waiting().or(self.active()),
            _ => self.active().or(self.waiting()),
        }
        .cloned()
        .ok_or(ShellCacheError::NoActiveWorker)?;

        let (tx, rx) = oneshot::channel();
        target.handle_message(message, Some(tx)).await?;

        if message == ControlMessage::SkipWaiting && self.waiting.is_some() {
            self.skip_waiting().await?;
        }

        rx.await
            .map_err(|_| ShellCacheError::Internal(format!("no reply to {}", message)))
    }

    /// The worker that receives push and sync events
    pub fn controller(&self) -> ShellCacheResult<&Arc<CacheWorker>> {
        self.active().ok_or(ShellCacheError::NoActiveWorker)
    }

    /// Wait for background work of the active worker
    pub async fn settle(&self) {
        if let Some(worker) = self.active() {
            worker.settle().await;
        }
    }

    /// Snapshot for persistence
    pub fn record(&self) -> RegistrationRecord {
        RegistrationRecord {
            active: self.active.as_ref().map(Slot::record),
            waiting: self.waiting.as_ref().map(Slot::record),
            updated_at: Some(Utc::now()),
        }
    }
}
