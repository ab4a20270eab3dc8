//! HTTP Transport
//!
//! The outbound request seam wrapped by `ApiClient`, plus its reqwest
//! implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{CacheError, Result};

// == HTTP Method ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

// == API Request ==
/// An outbound call: method, endpoint path and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub endpoint: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint, None)
    }

    pub fn post(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, endpoint, Some(body))
    }

    pub fn put(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, endpoint, Some(body))
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint, None)
    }

    /// Deterministic cache key: `api:{METHOD}:{endpoint}:{body-json}`.
    ///
    /// JSON objects serialize with sorted keys, so equal bodies give equal keys.
    pub fn cache_key(&self) -> String {
        let body = self
            .body
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        format!("api:{}:{}:{}", self.method, self.endpoint, body)
    }
}

// == Transport Trait ==
/// Sends a request and returns the decoded JSON response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<Value>;
}

// == Reqwest Transport ==
/// JSON-over-HTTP transport against a fixed base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.url(&request.endpoint);
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CacheError::Upstream(format!("{} {} failed: {}", request.method, url, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CacheError::Upstream(format!("reading {} failed: {}", url, e)))?;

        if !status.is_success() {
            return Err(CacheError::Upstream(format!(
                "{} {} returned {}: {}",
                request.method,
                url,
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
