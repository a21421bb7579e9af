//! Test doubles for the network and the client host

use crate::cache::AssetManifest;
use crate::config::Config;
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::{Fetcher, Request, Response};
use crate::worker::clients::{Clients, Notification, WindowClient};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Default config pointed at a fake origin
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.network.origin = "https://app.example".to_string();
    config
}

/// Scripted fetcher: fixed responses per URL, 404 for anything else
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    stalled: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `asset <url>` for every manifest entry of `config`
    pub fn serving_manifest(config: &Config) -> Self {
        let fetcher = Self::new();
        for entry in AssetManifest::from_config(config).entries() {
            fetcher.respond(&entry.url, Response::new(200, format!("asset {}", entry.url)));
        }
        fetcher
    }

    pub fn respond(&self, url: &str, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    /// Make a single URL fail with a network error
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    /// Every later fetch hangs forever
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> ShellCacheResult<Response> {
        self.calls.lock().unwrap().push(request.url.clone());

        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&request.url)
        {
            return Err(ShellCacheError::network(&request.url, "connection refused"));
        }

        let response = self.responses.lock().unwrap().get(&request.url).cloned();
        Ok(response.unwrap_or_else(|| Response::new(404, "not found")))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Client host that records every call
#[derive(Default)]
pub struct RecordingClients {
    windows: Mutex<Vec<WindowClient>>,
    events: Mutex<Vec<String>>,
}

impl RecordingClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(self, id: &str, url: &str) -> Self {
        self.windows.lock().unwrap().push(WindowClient {
            id: id.to_string(),
            url: url.to_string(),
            focused: false,
        });
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Clients for RecordingClients {
    async fn claim(&self) -> ShellCacheResult<()> {
        self.record("claim".to_string());
        Ok(())
    }

    async fn windows(&self) -> ShellCacheResult<Vec<WindowClient>> {
        Ok(self.windows.lock().unwrap().clone())
    }

    async fn focus(&self, id: &str) -> ShellCacheResult<()> {
        self.record(format!("focus {id}"));
        Ok(())
    }

    async fn open_window(&self, url: &str) -> ShellCacheResult<()> {
        self.record(format!("open {url}"));
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> ShellCacheResult<()> {
        self.record(format!("show {}", notification.title));
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> ShellCacheResult<()> {
        self.record(format!("close {}", notification.title));
        Ok(())
    }
}
