//! Fetch handling strategies
//!
//! | Route         | Hit                              | Miss / failure                  |
//! |---------------|----------------------------------|---------------------------------|
//! | cache-first   | cached copy, refreshed detached  | network, stored in static cache |
//! | network-first | live response, stored in dynamic | cached copy, then offline       |
//! | passthrough   | network, untouched               | error propagates                |

use crate::cache::CacheKey;
use crate::error::ShellCacheResult;
use crate::http::{Request, Response};
use crate::worker::manager::{lock, CacheWorker};
use crate::worker::routing::Route;
use tracing::{debug, warn};

impl CacheWorker {
    /// Answer an intercepted request
    ///
    /// Only pass-through requests can fail; intercepted ones always produce
    /// a response, falling back to the offline response as a last resort.
    pub async fn handle_fetch(&self, request: &Request) -> ShellCacheResult<Response> {
        let route = self.settings.router.route(request);
        debug!(method = %request.method, url = %request.url, %route, "fetch");

        let key = match route {
            Route::Passthrough => return self.fetcher.fetch(request).await,
            _ => match CacheKey::for_request(request) {
                Ok(key) => key,
                Err(e) => {
                    debug!(error = %e, "request has no cache key, passing through");
                    return self.fetcher.fetch(request).await;
                }
            },
        };

        Ok(match route {
            Route::CacheFirst => self.cache_first(request, key).await,
            _ => self.network_first(request, key).await,
        })
    }

    async fn cache_first(&self, request: &Request, key: CacheKey) -> Response {
        if let Some(cached) = self.lookup(&key).await {
            debug!(%key, "cache hit");
            self.spawn_refresh(request.clone(), key);
            return cached;
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(&self.settings.names.static_name(), &key, &response)
                        .await;
                }
                response
            }
            Err(e) => {
                debug!(%key, error = %e, "cache miss while offline");
                self.offline_fallback(request).await
            }
        }
    }

    async fn network_first(&self, request: &Request, key: CacheKey) -> Response {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(&self.settings.names.dynamic_name(), &key, &response)
                        .await;
                }
                response
            }
            Err(e) => {
                debug!(%key, error = %e, "network failed, trying cache");
                match self.lookup(&key).await {
                    Some(cached) => cached,
                    None => self.offline_fallback(request).await,
                }
            }
        }
    }

    /// Cached shell for HTML requests, otherwise the synthetic 503
    async fn offline_fallback(&self, request: &Request) -> Response {
        if request.is_navigation() || request.wants_html() {
            match CacheKey::from_url(&self.settings.shell_url) {
                Ok(shell) => {
                    if let Some(document) = self.lookup(&shell).await {
                        debug!(url = %request.url, "serving cached shell");
                        return document;
                    }
                }
                Err(e) => warn!(error = %e, "shell document URL is invalid"),
            }
        }
        Response::offline()
    }

    /// Current static cache first, then current dynamic cache
    async fn lookup(&self, key: &CacheKey) -> Option<Response> {
        let names = &self.settings.names;
        for cache in [names.static_name(), names.dynamic_name()] {
            match self.storage.get(&cache, key).await {
                Ok(Some(hit)) => return Some(hit),
                Ok(None) => {}
                Err(e) => warn!(%cache, %key, error = %e, "cache read failed"),
            }
        }
        None
    }

    async fn store(&self, cache: &str, key: &CacheKey, response: &Response) {
        if let Err(e) = self.storage.put(cache, key, response).await {
            warn!(%cache, %key, error = %e, "cache write failed");
        }
    }

    /// Refresh a cached entry without delaying the response already served
    fn spawn_refresh(&self, request: Request, key: CacheKey) {
        let storage = self.storage.clone();
        let fetcher = self.fetcher.clone();
        let cache = self.settings.names.static_name();

        let handle = tokio::spawn(async move {
            match fetcher.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    match storage.put(&cache, &key, &response).await {
                        Ok(()) => debug!(%key, "refreshed cached entry"),
                        Err(e) => warn!(%cache, %key, error = %e, "cache write failed"),
                    }
                }
                Ok(response) => debug!(%key, status = response.status, "refresh not stored"),
                Err(e) => debug!(%key, error = %e, "background refresh failed"),
            }
        });

        let mut refreshes = lock(&self.refreshes);
        refreshes.retain(|h| !h.is_finished());
        refreshes.push(handle);
    }
}
