//! AI answers to common questions and curated recommendation sets.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheOptions, CacheService, WarmupReport, WarmupTask};
use crate::config::WarmupConfig;
use crate::source::DirectoryDataSource;
use crate::warmup::{finish, source_task, CacheWarmer};

const RESPONSE_TTL: Duration = Duration::from_secs(60 * 60);
const RECOMMENDATIONS_TTL: Duration = Duration::from_secs(30 * 60);

pub struct AiWarmer {
    cache: CacheService,
    source: Arc<dyn DirectoryDataSource>,
    queries: Vec<String>,
    recommendation_sets: Vec<String>,
}

impl AiWarmer {
    pub fn new(
        cache: CacheService,
        source: Arc<dyn DirectoryDataSource>,
        config: &WarmupConfig,
    ) -> Self {
        Self {
            cache,
            source,
            queries: config.ai_queries.clone(),
            recommendation_sets: config.ai_recommendation_sets.clone(),
        }
    }
}

#[async_trait]
impl CacheWarmer for AiWarmer {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn warmup(&self) -> anyhow::Result<WarmupReport> {
        let responses = self.queries.iter().map(|query| {
            let query = query.clone();
            source_task(
                &self.source,
                format!("ai:response:{}", query),
                CacheOptions::new()
                    .ttl(RESPONSE_TTL)
                    .tags(["ai", "ai:response"])
                    .compress(true),
                |s| async move { s.ai_response(&query).await },
            )
        });
        let recommendations = self.recommendation_sets.iter().map(|set| {
            let set = set.clone();
            source_task(
                &self.source,
                format!("ai:recommendations:{}", set),
                CacheOptions::new()
                    .ttl(RECOMMENDATIONS_TTL)
                    .tags(["ai", "ai:recommendations"]),
                |s| async move { s.ai_recommendations(&set).await },
            )
        });
        let tasks: Vec<WarmupTask> = responses.chain(recommendations).collect();

        finish(self.name(), self.cache.warmup_tasks(tasks).await)
    }
}
