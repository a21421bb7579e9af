//! Push, notification click and background sync events

use crate::error::ShellCacheResult;
use crate::http::request::resolve_url;
use crate::worker::clients::Notification;
use crate::worker::manager::CacheWorker;
use serde::Deserialize;
use tracing::{debug, info};

/// Fields a push payload may carry; anything missing uses the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse a JSON payload; any other data becomes the notification body
    pub fn parse(data: &[u8]) -> Self {
        match serde_json::from_slice::<PushPayload>(data) {
            Ok(payload) => payload,
            Err(_) => Self {
                body: Some(String::from_utf8_lossy(data).into_owned()),
                ..Self::default()
            },
        }
    }
}

/// What a notification click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing application window was focused
    Focused(String),
    /// A new window was opened at this URL
    Opened(String),
}

impl CacheWorker {
    /// Show a notification for a push message; no payload shows nothing
    pub async fn handle_push(&self, data: Option<&[u8]>) -> ShellCacheResult<Option<Notification>> {
        let Some(data) = data.filter(|d| !d.is_empty()) else {
            debug!("push without payload, nothing to show");
            return Ok(None);
        };

        let payload = PushPayload::parse(data);
        let defaults = &self.settings.notifications;
        let origin = self.settings.app_root.trim_end_matches('/');
        let notification = Notification {
            title: payload.title.unwrap_or_else(|| defaults.title.clone()),
            body: payload.body.unwrap_or_else(|| defaults.body.clone()),
            icon: resolve_url(origin, &defaults.icon),
            url: resolve_url(origin, payload.url.as_deref().unwrap_or(&defaults.url)),
        };

        self.clients.show_notification(&notification).await?;
        info!(title = %notification.title, "push notification shown");
        Ok(Some(notification))
    }

    /// Close the notification, then focus an app window or open a new one
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
    ) -> ShellCacheResult<ClickOutcome> {
        self.clients.close_notification(notification).await?;

        let windows = self.clients.windows().await?;
        if let Some(window) = windows
            .iter()
            .find(|w| w.url.starts_with(&self.settings.app_root))
        {
            self.clients.focus(&window.id).await?;
            return Ok(ClickOutcome::Focused(window.id.clone()));
        }

        self.clients.open_window(&notification.url).await?;
        Ok(ClickOutcome::Opened(notification.url.clone()))
    }

    /// Background sync: acknowledged and logged, nothing is replayed
    pub async fn handle_sync(&self, tag: &str) -> ShellCacheResult<()> {
        info!(tag, "background sync");
        Ok(())
    }
}
