//! API Client Module
//!
//! Wraps a `Transport` and optionally reads and writes responses through a
//! cache, keyed by method, endpoint and body.

mod transport;

pub use transport::{ApiRequest, HttpMethod, ReqwestTransport, Transport};

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheOptions, CacheService, Priority};
use crate::error::Result;

// == Request Cache Options ==
/// Per-call caching instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCacheOptions {
    pub ttl: Duration,
    pub tags: Vec<String>,
    pub priority: Priority,
}

impl RequestCacheOptions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tags: Vec::new(),
            priority: Priority::Normal,
        }
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn cache_options(&self) -> CacheOptions {
        CacheOptions::new()
            .ttl(self.ttl)
            .priority(self.priority)
            .tags(self.tags.iter().cloned())
    }
}

// == API Client ==
pub struct ApiClient<T> {
    transport: T,
    cache: CacheService,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, cache: CacheService) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Sends `request`, consulting the cache first when `cache` is given.
    ///
    /// Only successful responses are stored.
    pub async fn request(
        &self,
        request: ApiRequest,
        cache: Option<&RequestCacheOptions>,
    ) -> Result<Value> {
        let Some(options) = cache else {
            return self.transport.send(&request).await;
        };

        let key = request.cache_key();
        if let Some(hit) = self.cache.get::<Value>(&key).await {
            debug!("Serving {} {} from cache", request.method, request.endpoint);
            return Ok(hit);
        }

        let response = self.transport.send(&request).await?;
        if let Err(e) = self.cache.set(&key, &response, &options.cache_options()).await {
            warn!("Failed to cache response for '{}': {}", key, e);
        }
        Ok(response)
    }

    pub async fn get(&self, endpoint: &str, cache: Option<&RequestCacheOptions>) -> Result<Value> {
        self.request(ApiRequest::get(endpoint), cache).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.request(ApiRequest::post(endpoint, body), None).await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.request(ApiRequest::put(endpoint, body), None).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(ApiRequest::delete(endpoint), None).await
    }

    /// Drops every cached response tagged `tag`.
    pub async fn invalidate_tag(&self, tag: &str) -> usize {
        self.cache.invalidate_by_tag(tag).await
    }

    pub async fn invalidate_tags<S: AsRef<str>>(&self, tags: &[S]) -> usize {
        let mut removed = 0;
        for tag in tags {
            removed += self.cache.invalidate_by_tag(tag.as_ref()).await;
        }
        removed
    }
}
