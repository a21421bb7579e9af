//! Outgoing request model

use crate::error::{ShellCacheError, ShellCacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use ureq::http::Uri;

/// How the request was issued by the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    SameOrigin,
    #[default]
    Cors,
    NoCors,
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate => write!(f, "navigate"),
            Self::SameOrigin => write!(f, "same-origin"),
            Self::Cors => write!(f, "cors"),
            Self::NoCors => write!(f, "no-cors"),
        }
    }
}

/// A request issued by the application shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-case HTTP method
    pub method: String,
    /// Absolute URL
    pub url: String,
    /// Header pairs in insertion order
    pub headers: Vec<(String, String)>,
    pub mode: RequestMode,
    pub body: Vec<u8>,
}

impl Request {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            mode: RequestMode::default(),
            body: Vec::new(),
        }
    }

    /// Create a page-navigation request accepting HTML
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::get(url)
            .with_mode(RequestMode::Navigate)
            .with_header("Accept", "text/html,application/xhtml+xml")
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Whether the request targets an HTML document
    pub fn wants_html(&self) -> bool {
        if self
            .header("accept")
            .is_some_and(|accept| accept.contains("text/html"))
        {
            return true;
        }
        self.uri()
            .map(|uri| uri.path().to_ascii_lowercase().ends_with(".html"))
            .unwrap_or(false)
    }

    /// Parse the URL, ignoring any fragment
    pub fn uri(&self) -> ShellCacheResult<Uri> {
        parse_url(&self.url)
    }
}

/// Parse an absolute URL. Fragments never reach the network and are dropped.
pub(crate) fn parse_url(url: &str) -> ShellCacheResult<Uri> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let uri: Uri = without_fragment
        .parse()
        .map_err(|e| ShellCacheError::InvalidUrl(format!("{}: {}", url, e)))?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(ShellCacheError::InvalidUrl(format!(
            "{}: expected an absolute URL",
            url
        )));
    }
    Ok(uri)
}

/// Resolve a manifest path or URL against the application origin
pub fn resolve_url(origin: &str, path_or_url: &str) -> String {
    if path_or_url.contains("://") {
        return path_or_url.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path_or_url.starts_with('/') {
        format!("{}{}", origin, path_or_url)
    } else {
        format!("{}/{}", origin, path_or_url)
    }
}
