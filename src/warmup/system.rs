//! System-wide data: global stats, configuration and default preferences.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheOptions, CacheService, Priority, WarmupReport};
use crate::source::DirectoryDataSource;
use crate::warmup::{finish, source_task, CacheWarmer};

const STATS_TTL: Duration = Duration::from_secs(5 * 60);
const CONFIG_TTL: Duration = Duration::from_secs(60 * 60);

pub struct SystemWarmer {
    cache: CacheService,
    source: Arc<dyn DirectoryDataSource>,
}

impl SystemWarmer {
    pub fn new(cache: CacheService, source: Arc<dyn DirectoryDataSource>) -> Self {
        Self { cache, source }
    }
}

#[async_trait]
impl CacheWarmer for SystemWarmer {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn warmup(&self) -> anyhow::Result<WarmupReport> {
        let base = CacheOptions::new().tag("system");
        let tasks = vec![
            source_task(
                &self.source,
                "system:stats",
                base.clone().ttl(STATS_TTL).priority(Priority::High),
                |s| async move { s.global_stats().await },
            ),
            source_task(
                &self.source,
                "system:config",
                base.clone().ttl(CONFIG_TTL).priority(Priority::High),
                |s| async move { s.system_config().await },
            ),
            source_task(
                &self.source,
                "system:default-preferences",
                base.ttl(CONFIG_TTL),
                |s| async move { s.default_preferences().await },
            ),
        ];

        finish(self.name(), self.cache.warmup_tasks(tasks).await)
    }
}
