//! Popular searches by query text and by location. Result pages are large,
//! so they are stored compressed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheOptions, CacheService, WarmupReport, WarmupTask};
use crate::config::WarmupConfig;
use crate::source::DirectoryDataSource;
use crate::warmup::{finish, source_task, CacheWarmer};

const SEARCH_TTL: Duration = Duration::from_secs(10 * 60);

pub struct SearchWarmer {
    cache: CacheService,
    source: Arc<dyn DirectoryDataSource>,
    queries: Vec<String>,
    locations: Vec<String>,
}

impl SearchWarmer {
    pub fn new(
        cache: CacheService,
        source: Arc<dyn DirectoryDataSource>,
        config: &WarmupConfig,
    ) -> Self {
        Self {
            cache,
            source,
            queries: config.search_queries.clone(),
            locations: config.search_locations.clone(),
        }
    }

    fn options(kind: &str) -> CacheOptions {
        CacheOptions::new()
            .ttl(SEARCH_TTL)
            .tags(["search".to_string(), format!("search:{}", kind)])
            .compress(true)
    }
}

#[async_trait]
impl CacheWarmer for SearchWarmer {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn warmup(&self) -> anyhow::Result<WarmupReport> {
        let by_query = self.queries.iter().map(|query| {
            let query = query.clone();
            source_task(
                &self.source,
                format!("search:query:{}", query),
                Self::options("query"),
                |s| async move { s.search_by_query(&query).await },
            )
        });
        let by_location = self.locations.iter().map(|location| {
            let location = location.clone();
            source_task(
                &self.source,
                format!("search:location:{}", location),
                Self::options("location"),
                |s| async move { s.search_by_location(&location).await },
            )
        });
        let tasks: Vec<WarmupTask> = by_query.chain(by_location).collect();

        finish(self.name(), self.cache.warmup_tasks(tasks).await)
    }
}
