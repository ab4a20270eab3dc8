//! Cache Initializer
//!
//! Runs every warmer once per process. Callers racing on `initialize` share
//! the single run and all receive the same summary.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::cache::{duration_ms, CacheOptions, WarmupReport};
use crate::config::WarmupConfig;
use crate::error::{CacheError, Result};
use crate::registry::CacheRegistry;
use crate::source::DirectoryDataSource;
use crate::warmup::{default_warmers, source_task, CacheWarmer};

const USER_TTL: Duration = Duration::from_secs(15 * 60);

// == Summary ==
/// Result of one warmer within an initialization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarmerOutcome {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<WarmupReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitializationSummary {
    pub warmers: Vec<WarmerOutcome>,
    /// Sum of the reports of the warmers that completed
    pub total: WarmupReport,
    pub failed_warmers: usize,
    pub duration_ms: u64,
}

impl InitializationSummary {
    pub fn is_complete(&self) -> bool {
        self.failed_warmers == 0
    }
}

// == Cache Initializer ==
pub struct CacheInitializer {
    warmers: Vec<Arc<dyn CacheWarmer>>,
    registry: CacheRegistry,
    source: Arc<dyn DirectoryDataSource>,
    summary: OnceCell<InitializationSummary>,
}

impl CacheInitializer {
    pub fn new(
        warmers: Vec<Arc<dyn CacheWarmer>>,
        registry: CacheRegistry,
        source: Arc<dyn DirectoryDataSource>,
    ) -> Self {
        Self {
            warmers,
            registry,
            source,
            summary: OnceCell::new(),
        }
    }

    /// Initializer over the standard system, business, search and AI warmers.
    pub fn with_default_warmers(
        registry: CacheRegistry,
        source: Arc<dyn DirectoryDataSource>,
        config: &WarmupConfig,
    ) -> Self {
        let warmers = default_warmers(&registry, Arc::clone(&source), config);
        Self::new(warmers, registry, source)
    }

    pub fn is_initialized(&self) -> bool {
        self.summary.initialized()
    }

    /// The stored summary, if initialization has finished.
    pub fn summary(&self) -> Option<&InitializationSummary> {
        self.summary.get()
    }

    /// Runs all warmers concurrently the first time it is called. A failing
    /// warmer is recorded in the summary and does not affect the others.
    pub async fn initialize(&self) -> &InitializationSummary {
        self.summary.get_or_init(|| self.run()).await
    }

    async fn run(&self) -> InitializationSummary {
        info!("Initializing caches with {} warmers", self.warmers.len());
        let started = Instant::now();

        let results = join_all(self.warmers.iter().map(|warmer| async move {
            (warmer.name(), warmer.warmup().await)
        }))
        .await;

        let mut total = WarmupReport::default();
        let mut failed_warmers = 0;
        let warmers = results
            .into_iter()
            .map(|(name, result)| match result {
                Ok(report) => {
                    total.merge(report);
                    WarmerOutcome {
                        name: name.to_string(),
                        report: Some(report),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("{} warmer failed: {:#}", name, e);
                    failed_warmers += 1;
                    WarmerOutcome {
                        name: name.to_string(),
                        report: None,
                        error: Some(format!("{:#}", e)),
                    }
                }
            })
            .collect();

        let summary = InitializationSummary {
            warmers,
            total,
            failed_warmers,
            duration_ms: duration_ms(started.elapsed()),
        };
        info!(
            "Cache initialization finished in {}ms: {} loaded, {} failed fetches, {} failed warmers",
            summary.duration_ms, total.loaded, total.failed, failed_warmers
        );
        summary
    }

    // == Per-user warmup ==
    /// Primes a user's saved items, preferences and recent searches in the
    /// general cache. Does not wait for or require global initialization.
    pub async fn warmup_user_specific_cache(&self, user_id: &str) -> Result<WarmupReport> {
        let user_id = validate_user_id(user_id)?;
        let options = CacheOptions::new()
            .ttl(USER_TTL)
            .tag(format!("user:{}", user_id));

        let saved = user_id.to_string();
        let prefs = user_id.to_string();
        let recent = user_id.to_string();
        let tasks = vec![
            source_task(
                &self.source,
                format!("user:{}:saved-items", user_id),
                options.clone(),
                |s| async move { s.user_saved_items(&saved).await },
            ),
            source_task(
                &self.source,
                format!("user:{}:preferences", user_id),
                options.clone(),
                |s| async move { s.user_preferences(&prefs).await },
            ),
            source_task(
                &self.source,
                format!("user:{}:recent-searches", user_id),
                options,
                |s| async move { s.user_recent_searches(&recent).await },
            ),
        ];

        let report = self.registry.general().warmup_tasks(tasks).await;
        info!(
            "User {} warmup: {} loaded, {} skipped, {} failed",
            user_id, report.loaded, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Drops every entry primed for `user_id`.
    pub async fn invalidate_user_cache(&self, user_id: &str) -> Result<usize> {
        let user_id = validate_user_id(user_id)?;
        Ok(self
            .registry
            .general()
            .invalidate_by_tag(&format!("user:{}", user_id))
            .await)
    }
}

fn validate_user_id(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(CacheError::InvalidRequest("user id cannot be empty".to_string()));
    }
    Ok(trimmed)
}
