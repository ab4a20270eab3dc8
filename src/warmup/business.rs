//! Business listings: per-category pages plus the featured and verified sets.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheOptions, CacheService, Priority, WarmupReport};
use crate::config::WarmupConfig;
use crate::source::DirectoryDataSource;
use crate::warmup::{finish, source_task, CacheWarmer};

const CATEGORY_TTL: Duration = Duration::from_secs(15 * 60);
const FEATURED_TTL: Duration = Duration::from_secs(10 * 60);
const VERIFIED_TTL: Duration = Duration::from_secs(30 * 60);

pub struct BusinessWarmer {
    cache: CacheService,
    source: Arc<dyn DirectoryDataSource>,
    categories: Vec<String>,
}

impl BusinessWarmer {
    pub fn new(
        cache: CacheService,
        source: Arc<dyn DirectoryDataSource>,
        config: &WarmupConfig,
    ) -> Self {
        Self {
            cache,
            source,
            categories: config.categories.clone(),
        }
    }
}

#[async_trait]
impl CacheWarmer for BusinessWarmer {
    fn name(&self) -> &'static str {
        "business"
    }

    async fn warmup(&self) -> anyhow::Result<WarmupReport> {
        let mut tasks: Vec<_> = self
            .categories
            .iter()
            .map(|category| {
                let options = CacheOptions::new()
                    .ttl(CATEGORY_TTL)
                    .tags(["businesses".to_string(), format!("category:{}", category)]);
                let category = category.clone();
                source_task(
                    &self.source,
                    format!("businesses:category:{}", category),
                    options,
                    |s| async move { s.businesses_by_category(&category).await },
                )
            })
            .collect();

        tasks.push(source_task(
            &self.source,
            "businesses:featured",
            CacheOptions::new()
                .ttl(FEATURED_TTL)
                .priority(Priority::High)
                .tags(["businesses", "featured"]),
            |s| async move { s.featured_businesses().await },
        ));
        tasks.push(source_task(
            &self.source,
            "businesses:verified",
            CacheOptions::new()
                .ttl(VERIFIED_TTL)
                .tags(["businesses", "verified"]),
            |s| async move { s.verified_businesses().await },
        ));

        finish(self.name(), self.cache.warmup_tasks(tasks).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::warmup::testing::MockSource;

    fn config(categories: &[&str]) -> WarmupConfig {
        WarmupConfig {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            ..WarmupConfig::default()
        }
    }

    #[tokio::test]
    async fn test_loads_categories_featured_and_verified() {
        let source = Arc::new(MockSource::default());
        let cache = CacheService::new("business", CacheStore::new(200, 1024));
        let warmer = BusinessWarmer::new(cache.clone(), source.clone(), &config(&["cafes", "bars"]));

        let report = warmer.warmup().await.unwrap();

        assert_eq!(report.loaded, 4);
        assert_eq!(source.count("businesses_by_category"), 2);
        assert!(cache.contains("businesses:category:cafes").await);
        assert!(cache.contains("businesses:category:bars").await);
        assert!(cache.contains("businesses:featured").await);
        assert!(cache.contains("businesses:verified").await);
    }

    #[tokio::test]
    async fn test_category_tag_scopes_invalidation() {
        let source = Arc::new(MockSource::default());
        let cache = CacheService::new("business", CacheStore::new(200, 1024));
        let warmer = BusinessWarmer::new(cache.clone(), source, &config(&["cafes", "bars"]));
        warmer.warmup().await.unwrap();

        assert_eq!(cache.invalidate_by_tag("category:cafes").await, 1);
        assert!(cache.contains("businesses:category:bars").await);
        assert_eq!(cache.invalidate_by_tag("businesses").await, 3);
    }

    #[tokio::test]
    async fn test_second_run_skips_cached_keys() {
        let source = Arc::new(MockSource::default());
        let cache = CacheService::new("business", CacheStore::new(200, 1024));
        let warmer = BusinessWarmer::new(cache, source.clone(), &config(&["cafes"]));

        warmer.warmup().await.unwrap();
        let second = warmer.warmup().await.unwrap();

        assert_eq!(second.skipped, 3);
        assert_eq!(second.loaded, 0);
    }
}
