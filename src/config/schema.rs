//! Configuration schema for shellcache
//!
//! Configuration is stored at `~/.config/shellcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache naming and request classification
    pub cache: CacheConfig,

    /// Build-time asset manifest
    pub manifest: ManifestConfig,

    /// Network settings
    pub network: NetworkConfig,

    /// Worker lifecycle settings
    pub worker: WorkerConfig,

    /// Notification defaults for push events
    pub notifications: NotificationConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Override for the state directory (registration record)
    pub state_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            state_dir: None,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Prefix shared by every cache this application owns ("" = all caches)
    pub namespace: String,

    /// Deployment version; bump to roll caches over on next activation
    pub version: String,

    /// Path of the shell document served to offline navigations
    pub shell_document: String,

    /// File extensions treated as static assets
    pub static_extensions: Vec<String>,

    /// Same-origin path prefixes eligible for static classification
    pub static_prefixes: Vec<String>,

    /// Hostnames served cache-first as external/CDN resources
    pub cdn_hosts: Vec<String>,

    /// Override for the on-disk cache storage directory
    pub storage_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "hmp".to_string(),
            version: "v1".to_string(),
            shell_document: "/index.html".to_string(),
            static_extensions: [
                "css", "js", "html", "json", "png", "jpg", "jpeg", "svg", "ico", "woff", "woff2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            static_prefixes: vec!["/".to_string()],
            cdn_hosts: vec![
                "cdn.jsdelivr.net".to_string(),
                "unpkg.com".to_string(),
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            storage_dir: None,
        }
    }
}

/// Asset manifest: URLs that must be in the static cache after install
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Same-origin paths; any failure aborts install
    pub local: Vec<String>,

    /// Absolute CDN URLs; failures are tolerated individually
    pub external: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            local: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/css/styles.css".to_string(),
                "/js/app.js".to_string(),
                "/manifest.json".to_string(),
                "/icons/icon-192.png".to_string(),
                "/icons/icon-512.png".to_string(),
            ],
            external: vec![
                "https://unpkg.com/react@18/umd/react.production.min.js".to_string(),
                "https://unpkg.com/react-dom@18/umd/react-dom.production.min.js".to_string(),
                "https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap"
                    .to_string(),
            ],
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Application origin; relative URLs resolve against it
    pub origin: String,

    /// Per-request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            timeout_secs: 15,
            user_agent: concat!("shellcache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Worker lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Activate right after install instead of waiting for the old worker
    pub skip_waiting: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { skip_waiting: true }
    }
}

/// Defaults applied to push notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    pub body: String,
    pub icon: String,
    /// Window opened when a notification without a URL is clicked
    pub url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Hair & Makeup Pro".to_string(),
            body: "You have a new update".to_string(),
            icon: "/icons/icon-192.png".to_string(),
            url: "/".to_string(),
        }
    }
}
