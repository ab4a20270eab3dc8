//! Directory Data Source
//!
//! The backend contract the warmers fetch through. Payloads are opaque JSON.

mod rest;

pub use rest::RestDirectorySource;

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait DirectoryDataSource: Send + Sync {
    async fn global_stats(&self) -> anyhow::Result<Value>;
    async fn system_config(&self) -> anyhow::Result<Value>;
    async fn default_preferences(&self) -> anyhow::Result<Value>;

    async fn businesses_by_category(&self, category: &str) -> anyhow::Result<Value>;
    async fn featured_businesses(&self) -> anyhow::Result<Value>;
    async fn verified_businesses(&self) -> anyhow::Result<Value>;

    async fn search_by_query(&self, query: &str) -> anyhow::Result<Value>;
    async fn search_by_location(&self, location: &str) -> anyhow::Result<Value>;

    async fn ai_response(&self, query: &str) -> anyhow::Result<Value>;
    async fn ai_recommendations(&self, set: &str) -> anyhow::Result<Value>;

    async fn user_saved_items(&self, user_id: &str) -> anyhow::Result<Value>;
    async fn user_preferences(&self, user_id: &str) -> anyhow::Result<Value>;
    async fn user_recent_searches(&self, user_id: &str) -> anyhow::Result<Value>;
}
