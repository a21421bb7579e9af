//! Request classification
//!
//! Every intercepted request resolves to exactly one [`Route`] before any
//! cache or network work happens.

use crate::config::Config;
use crate::error::ShellCacheResult;
use crate::http::request::parse_url;
use crate::http::Request;
use std::collections::HashSet;
use std::fmt;
use ureq::http::Uri;

/// Caching strategy chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not intercepted: non-GET or non-http(s)
    Passthrough,
    /// Serve from cache, refresh in the background
    CacheFirst,
    /// Serve from network, fall back to cache
    NetworkFirst,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::CacheFirst => write!(f, "cache-first"),
            Self::NetworkFirst => write!(f, "network-first"),
        }
    }
}

/// Scheme, lower-cased host and effective port
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    fn of(uri: &Uri) -> Self {
        let scheme = uri.scheme_str().unwrap_or_default().to_ascii_lowercase();
        let port = uri.port_u16().or(match scheme.as_str() {
            "http" => Some(80),
            "https" => Some(443),
            _ => None,
        });
        Self {
            scheme,
            host: uri.host().unwrap_or_default().to_ascii_lowercase(),
            port,
        }
    }
}

/// Classifies requests by origin, path prefix, extension and CDN host
#[derive(Debug, Clone)]
pub struct Router {
    origin: Origin,
    static_prefixes: Vec<String>,
    static_extensions: HashSet<String>,
    cdn_hosts: HashSet<String>,
}

impl Router {
    pub fn from_config(config: &Config) -> ShellCacheResult<Self> {
        let origin = Origin::of(&parse_url(&config.network.origin)?);
        Ok(Self {
            origin,
            static_prefixes: config.cache.static_prefixes.clone(),
            static_extensions: config
                .cache
                .static_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            cdn_hosts: config
                .cache
                .cdn_hosts
                .iter()
                .map(|host| host.to_ascii_lowercase())
                .collect(),
        })
    }

    /// Resolve the strategy for a request
    pub fn route(&self, request: &Request) -> Route {
        if !request.is_get() {
            return Route::Passthrough;
        }

        let Ok(uri) = request.uri() else {
            return Route::Passthrough;
        };
        let origin = Origin::of(&uri);
        if origin.scheme != "http" && origin.scheme != "https" {
            return Route::Passthrough;
        }

        if self.cdn_hosts.contains(&origin.host) {
            return Route::CacheFirst;
        }

        if origin == self.origin && self.is_static_path(uri.path()) {
            return Route::CacheFirst;
        }

        Route::NetworkFirst
    }

    fn is_static_path(&self, path: &str) -> bool {
        if !self
            .static_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return false;
        }

        let file_name = path.rsplit('/').next().unwrap_or_default();
        file_name
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| {
                !stem.is_empty() && self.static_extensions.contains(&ext.to_ascii_lowercase())
            })
    }
}
