//! REST-backed data source. Calls are never cached here; the warmers own
//! caching of what they fetch.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};

use crate::cache::{CacheService, CacheStore};
use crate::client::{ApiClient, ApiRequest, ReqwestTransport, Transport};
use crate::source::DirectoryDataSource;

pub struct RestDirectorySource<T = ReqwestTransport> {
    client: ApiClient<T>,
}

impl<T: Transport> RestDirectorySource<T> {
    pub fn new(transport: T) -> Self {
        // Zero-capacity cache: requests below always pass `None` anyway.
        let cache = CacheService::new("source", CacheStore::new(0, usize::MAX));
        Self {
            client: ApiClient::new(transport, cache),
        }
    }

    async fn fetch(&self, request: ApiRequest) -> anyhow::Result<Value> {
        Ok(self.client.request(request, None).await?)
    }
}

/// `/users/{id}/{resource}` with the id percent-encoded as one path segment.
fn user_endpoint(user_id: &str, resource: &str) -> anyhow::Result<String> {
    if matches!(user_id, "" | "." | "..") {
        anyhow::bail!("invalid user id: {:?}", user_id);
    }
    let mut url = Url::parse("http://backend/")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("base URL cannot hold a path"))?
        .pop_if_empty()
        .extend(["users", user_id, resource]);
    Ok(url.path().to_string())
}

#[async_trait]
impl<T: Transport> DirectoryDataSource for RestDirectorySource<T> {
    async fn global_stats(&self) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get("/stats")).await
    }

    async fn system_config(&self) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get("/config")).await
    }

    async fn default_preferences(&self) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get("/preferences/defaults")).await
    }

    async fn businesses_by_category(&self, category: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::post("/businesses/by-category", json!({ "category": category })))
            .await
    }

    async fn featured_businesses(&self) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get("/businesses/featured")).await
    }

    async fn verified_businesses(&self) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get("/businesses/verified")).await
    }

    async fn search_by_query(&self, query: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::post("/search", json!({ "query": query }))).await
    }

    async fn search_by_location(&self, location: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::post("/search/location", json!({ "location": location })))
            .await
    }

    async fn ai_response(&self, query: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::post("/ai/query", json!({ "query": query }))).await
    }

    async fn ai_recommendations(&self, set: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::post("/ai/recommendations", json!({ "set": set })))
            .await
    }

    async fn user_saved_items(&self, user_id: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get(user_endpoint(user_id, "saved-items")?))
            .await
    }

    async fn user_preferences(&self, user_id: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get(user_endpoint(user_id, "preferences")?))
            .await
    }

    async fn user_recent_searches(&self, user_id: &str) -> anyhow::Result<Value> {
        self.fetch(ApiRequest::get(user_endpoint(user_id, "recent-searches")?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheError, Result};
    use std::sync::{Arc, Mutex};

    /// Records every request it receives.
    #[derive(Default, Clone)]
    struct RecordingTransport {
        seen: Arc<Mutex<Vec<ApiRequest>>>,
        fail: bool,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: &ApiRequest) -> Result<Value> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(CacheError::Upstream("500 Internal Server Error".to_string()));
            }
            Ok(json!({ "ok": true }))
        }
    }

    #[tokio::test]
    async fn test_category_request_shape() {
        let transport = RecordingTransport::default();
        let source = RestDirectorySource::new(transport.clone());

        source.businesses_by_category("coffee shops").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].endpoint, "/businesses/by-category");
        assert_eq!(seen[0].body, Some(json!({ "category": "coffee shops" })));
    }

    #[tokio::test]
    async fn test_user_endpoints() {
        let transport = RecordingTransport::default();
        let source = RestDirectorySource::new(transport.clone());

        source.user_saved_items("u1").await.unwrap();
        source.user_preferences("u1").await.unwrap();
        source.user_recent_searches("u1").await.unwrap();

        let endpoints: Vec<String> = transport
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.endpoint.clone())
            .collect();
        assert_eq!(
            endpoints,
            vec![
                "/users/u1/saved-items",
                "/users/u1/preferences",
                "/users/u1/recent-searches"
            ]
        );
    }

    #[tokio::test]
    async fn test_user_id_stays_in_one_segment() {
        let transport = RecordingTransport::default();
        let source = RestDirectorySource::new(transport.clone());

        source
            .user_saved_items("alice/../../admin/config?x=")
            .await
            .unwrap();

        let endpoint = transport.seen.lock().unwrap()[0].endpoint.clone();
        assert!(endpoint.starts_with("/users/alice%2F"), "{}", endpoint);
        assert!(endpoint.ends_with("/saved-items"), "{}", endpoint);
        assert!(!endpoint.contains('?'), "{}", endpoint);
        assert!(!endpoint.contains("/../"), "{}", endpoint);
        assert_eq!(endpoint.split('/').count(), 4);
    }

    #[tokio::test]
    async fn test_dot_user_ids_rejected() {
        let transport = RecordingTransport::default();
        let source = RestDirectorySource::new(transport.clone());

        assert!(source.user_preferences("..").await.is_err());
        assert!(source.user_recent_searches(".").await.is_err());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_calls_are_not_cached() {
        let transport = RecordingTransport::default();
        let source = RestDirectorySource::new(transport.clone());

        source.featured_businesses().await.unwrap();
        source.featured_businesses().await.unwrap();

        assert_eq!(transport.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_error_surfaces() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let source = RestDirectorySource::new(transport);

        let err = source.global_stats().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
