//! Normalized request identity used as the cache key

use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::request::parse_url;
use crate::http::Request;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identity of a cacheable request: always GET plus a normalized URL
///
/// Normalization lower-cases scheme and host, drops default ports and
/// fragments, and turns an empty path into `/`. The query is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    method: String,
    url: String,
}

impl CacheKey {
    /// Key for a GET of `url`
    pub fn from_url(url: &str) -> ShellCacheResult<Self> {
        Ok(Self {
            method: "GET".to_string(),
            url: normalize_url(url)?,
        })
    }

    /// Key for a request; only GET requests have one
    pub fn for_request(request: &Request) -> ShellCacheResult<Self> {
        if !request.is_get() {
            return Err(ShellCacheError::Internal(format!(
                "{} requests are not cacheable",
                request.method
            )));
        }
        Self::from_url(&request.url)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stable SHA256 digest of the key, used for on-disk file names
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

fn normalize_url(url: &str) -> ShellCacheResult<String> {
    let uri = parse_url(url)?;
    let scheme = uri.scheme_str().unwrap_or("http").to_ascii_lowercase();
    let host = uri.host().unwrap_or_default().to_ascii_lowercase();

    let default_port = match scheme.as_str() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    let authority = match uri.port_u16() {
        Some(port) if Some(port) != default_port => format!("{}:{}", host, port),
        _ => host,
    };

    let path = if uri.path().is_empty() { "/" } else { uri.path() };
    let query = uri.query().map(|q| format!("?{}", q)).unwrap_or_default();

    Ok(format!("{}://{}{}{}", scheme, authority, path, query))
}
