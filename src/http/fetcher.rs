//! Network fetcher abstraction
//!
//! Provides a trait for performing a single request so the worker can run
//! against the real network (ureq) or against test doubles.

use crate::config::schema::NetworkConfig;
use crate::error::{ShellCacheError, ShellCacheResult};
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Abstract network interface
///
/// `fetch` returns `Err` only when no response was received at all. HTTP
/// error statuses are successful fetches and come back as `Ok`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one round trip
    async fn fetch(&self, request: &Request) -> ShellCacheResult<Response>;

    /// Get the human-readable transport name for display
    fn name(&self) -> &'static str;
}

/// Fetcher backed by a blocking ureq agent, driven on the blocking pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher from network settings
    pub fn new(config: &NetworkConfig) -> Self {
        let timeout = if config.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(config.timeout_secs))
        };

        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .into();

        Self { agent }
    }

    fn fetch_blocking(agent: &Agent, request: &Request) -> ShellCacheResult<Response> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = if request.body.is_empty() {
            let http_request = builder
                .body(())
                .map_err(|e| ShellCacheError::network(&request.url, e.to_string()))?;
            agent.run(http_request)
        } else {
            let http_request = builder
                .body(request.body.clone())
                .map_err(|e| ShellCacheError::network(&request.url, e.to_string()))?;
            agent.run(http_request)
        };

        let mut http_response =
            result.map_err(|e| ShellCacheError::network(&request.url, e.to_string()))?;

        let status = http_response.status();
        let headers = http_response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Any reachable server counts as a response, however large its body
        let body = http_response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ShellCacheError::network(&request.url, e.to_string()))?;

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> ShellCacheResult<Response> {
        debug!(method = %request.method, url = %request.url, "fetching");

        let agent = self.agent.clone();
        let request = request.clone();
        let url = request.url.clone();
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &request))
            .await
            .map_err(|e| ShellCacheError::network(url, format!("fetch task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "ureq"
    }
}
