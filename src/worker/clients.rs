//! Controlled application windows and notification display
//!
//! The worker never talks to windows directly. Everything it needs from the
//! host (claiming, focusing, opening windows, showing notifications) goes
//! through the [`Clients`] trait.

use crate::error::ShellCacheResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A top-level application window known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focused: bool,
}

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Absolute URL opened on click
    pub url: String,
}

/// Host interface for window and notification operations
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of every open window immediately
    async fn claim(&self) -> ShellCacheResult<()>;

    /// Open top-level windows, in host order
    async fn windows(&self) -> ShellCacheResult<Vec<WindowClient>>;

    async fn focus(&self, id: &str) -> ShellCacheResult<()>;

    async fn open_window(&self, url: &str) -> ShellCacheResult<()>;

    async fn show_notification(&self, notification: &Notification) -> ShellCacheResult<()>;

    async fn close_notification(&self, notification: &Notification) -> ShellCacheResult<()>;
}

/// Host without any windows; operations are logged and otherwise no-ops
///
/// Used by the command line, where notifications are rendered by the
/// command itself and clicks always open a new window.
#[derive(Debug, Default, Clone)]
pub struct HeadlessClients;

impl HeadlessClients {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clients for HeadlessClients {
    async fn claim(&self) -> ShellCacheResult<()> {
        info!("claimed clients");
        Ok(())
    }

    async fn windows(&self) -> ShellCacheResult<Vec<WindowClient>> {
        Ok(vec![])
    }

    async fn focus(&self, id: &str) -> ShellCacheResult<()> {
        info!(client = id, "focus window");
        Ok(())
    }

    async fn open_window(&self, url: &str) -> ShellCacheResult<()> {
        info!(url, "open window");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> ShellCacheResult<()> {
        info!(title = %notification.title, "show notification");
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> ShellCacheResult<()> {
        info!(title = %notification.title, "close notification");
        Ok(())
    }
}
