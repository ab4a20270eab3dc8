//! Cache Warmup Module
//!
//! Per-domain warmers that preload frequently read data into their named
//! cache, and the initializer that runs them once at startup.

mod ai;
mod business;
mod initializer;
mod search;
mod system;

pub use ai::AiWarmer;
pub use business::BusinessWarmer;
pub use initializer::{CacheInitializer, InitializationSummary, WarmerOutcome};
pub use search::SearchWarmer;
pub use system::SystemWarmer;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{CacheOptions, WarmupReport, WarmupTask};
use crate::config::WarmupConfig;
use crate::registry::CacheRegistry;
use crate::source::DirectoryDataSource;

/// Preloads one domain's cache.
#[async_trait]
pub trait CacheWarmer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetches this warmer's keys concurrently. Individual fetch failures
    /// are counted in the report; an error means the whole batch failed.
    async fn warmup(&self) -> anyhow::Result<WarmupReport>;
}

/// The four standard warmers, each bound to its domain's cache.
pub fn default_warmers(
    registry: &CacheRegistry,
    source: Arc<dyn DirectoryDataSource>,
    config: &WarmupConfig,
) -> Vec<Arc<dyn CacheWarmer>> {
    vec![
        Arc::new(SystemWarmer::new(registry.general().clone(), Arc::clone(&source))),
        Arc::new(BusinessWarmer::new(
            registry.business().clone(),
            Arc::clone(&source),
            config,
        )),
        Arc::new(SearchWarmer::new(
            registry.search().clone(),
            Arc::clone(&source),
            config,
        )),
        Arc::new(AiWarmer::new(registry.ai().clone(), source, config)),
    ]
}

/// Builds a task whose fetch runs against its own handle to `source`.
fn source_task<F, Fut>(
    source: &Arc<dyn DirectoryDataSource>,
    key: impl Into<String>,
    options: CacheOptions,
    fetch: F,
) -> WarmupTask
where
    F: FnOnce(Arc<dyn DirectoryDataSource>) -> Fut,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    WarmupTask::new(key, options, fetch(Arc::clone(source)))
}

/// A batch where every fetch failed is an error for the warmer as a whole.
fn finish(name: &str, report: WarmupReport) -> anyhow::Result<WarmupReport> {
    if report.failed > 0 && report.loaded == 0 && report.skipped == 0 {
        anyhow::bail!("{} warmup failed: all {} fetches failed", name, report.failed);
    }
    Ok(report)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_all_failed_is_error() {
        let report = WarmupReport {
            loaded: 0,
            skipped: 0,
            failed: 3,
        };
        assert!(finish("search", report).is_err());
    }

    #[test]
    fn test_finish_partial_failure_is_ok() {
        let report = WarmupReport {
            loaded: 1,
            skipped: 0,
            failed: 2,
        };
        assert_eq!(finish("search", report).unwrap(), report);
    }

    #[test]
    fn test_finish_empty_batch_is_ok() {
        assert!(finish("ai", WarmupReport::default()).is_ok());
    }

    #[test]
    fn test_default_warmers_cover_every_domain() {
        let registry = CacheRegistry::default();
        let source: Arc<dyn DirectoryDataSource> = Arc::new(testing::MockSource::default());
        let names: Vec<&str> = default_warmers(&registry, source, &WarmupConfig::default())
            .iter()
            .map(|w| w.name())
            .collect();
        assert_eq!(names, vec!["system", "business", "search", "ai"]);
    }
}
