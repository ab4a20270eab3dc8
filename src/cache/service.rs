//! Cache Service Module
//!
//! Shared async handle over a `CacheStore`: memoization,
//! stale-while-revalidate reads and batch warmup on top of the store's
//! synchronous operations.
//!
//! The store lock is never held across an awaited fetcher.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{
    duration_ms, CacheOptions, CacheStats, CacheStore, SwrOptions, WarmupReport, WarmupTask,
};
use crate::config::DomainConfig;
use crate::error::{CacheError, Result};

// == Cache Service ==
/// Cloneable handle to one named cache instance.
#[derive(Clone)]
pub struct CacheService {
    /// Domain name used in logs
    name: Arc<str>,
    /// Thread-safe cache store
    store: Arc<RwLock<CacheStore>>,
    /// Keys with a background refresh in flight
    revalidating: Arc<Mutex<HashSet<String>>>,
}

impl CacheService {
    pub fn new(name: impl Into<String>, store: CacheStore) -> Self {
        Self {
            name: Arc::from(name.into()),
            store: Arc::new(RwLock::new(store)),
            revalidating: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn from_config(name: impl Into<String>, config: &DomainConfig) -> Self {
        Self::new(name, CacheStore::from_config(config))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Set ==
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        options: &CacheOptions,
    ) -> Result<()> {
        self.store.write().await.set(key, data, options)
    }

    // == Get ==
    /// Write lock: a hit updates access stats.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.store.write().await.get(key)
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.store.read().await.contains(key)
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.invalidate(key)
    }

    pub async fn invalidate_by_tag(&self, tag: &str) -> usize {
        let removed = self.store.write().await.invalidate_by_tag(tag);
        debug!("Invalidated {} entries tagged '{}' in {} cache", removed, tag, self.name);
        removed
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
        info!("Cleared {} cache", self.name);
    }

    pub async fn cleanup(&self) -> usize {
        self.store.write().await.cleanup()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Memoize ==
    /// Returns the cached value for `key`, or runs `factory`, stores its
    /// result and returns it.
    ///
    /// Concurrent misses on the same key each run their own factory; the
    /// last write wins.
    pub async fn memoize<T, F, Fut>(&self, key: &str, factory: F, options: &CacheOptions) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            return Ok(hit);
        }

        let value = factory().await?;
        if let Err(e) = self.set(key, &value, options).await {
            warn!("Failed to store memoized '{}' in {} cache: {}", key, self.name, e);
        }
        Ok(value)
    }

    // == Stale While Revalidate ==
    /// Serves `key` according to its age:
    /// - younger than `stale_ttl`: returned as is
    /// - younger than `fresh_ttl`: returned as is, refreshed in a detached task
    /// - otherwise (or absent): `factory` is awaited and its result stored
    ///   with `ttl = fresh_ttl`
    ///
    /// A failed background refresh is logged; the stale value stands.
    pub async fn stale_while_revalidate<T, F, Fut>(
        &self,
        key: &str,
        factory: F,
        options: SwrOptions,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        if options.fresh_ttl < options.stale_ttl {
            return Err(CacheError::InvalidRequest(format!(
                "fresh_ttl ({:?}) must not be shorter than stale_ttl ({:?})",
                options.fresh_ttl, options.stale_ttl
            )));
        }
        let stale_ms = duration_ms(options.stale_ttl);
        let fresh_ms = duration_ms(options.fresh_ttl);

        let (cached, epoch) = {
            let mut store = self.store.write().await;
            (store.lookup_within(key, fresh_ms), store.invalidation_epoch())
        };
        if let Some((age, value)) = cached {
            match serde_json::from_value::<T>(value) {
                Ok(typed) => {
                    if age >= stale_ms {
                        self.spawn_revalidation(key, factory, options.store_options(), epoch);
                    }
                    return Ok(typed);
                }
                Err(e) => {
                    warn!("Cached value for '{}' has an unexpected shape: {}", key, e);
                    self.store.write().await.discard_unusable(key);
                }
            }
        }

        let value = factory().await?;
        if let Err(e) = self.set(key, &value, &options.store_options()).await {
            warn!("Failed to store '{}' in {} cache: {}", key, self.name, e);
        }
        Ok(value)
    }

    /// Detached refresh of a stale entry. At most one refresh per key runs at
    /// a time. The result is dropped if the cache was invalidated after
    /// `epoch` was observed.
    fn spawn_revalidation<T, F, Fut>(&self, key: &str, factory: F, options: CacheOptions, epoch: u64)
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let Some(guard) = RevalidationGuard::acquire(&self.revalidating, key) else {
            debug!("Refresh of '{}' already in flight", key);
            return;
        };

        let store = Arc::clone(&self.store);
        let name = Arc::clone(&self.name);
        let key = key.to_string();

        tokio::spawn(async move {
            let _guard = guard;
            match factory().await {
                Ok(value) => {
                    let mut store = store.write().await;
                    if store.invalidation_epoch() != epoch {
                        debug!("Dropping refresh of '{}' in {} cache: invalidated meanwhile", key, name);
                    } else if let Err(e) = store.set(&key, &value, &options) {
                        warn!("Failed to store refreshed '{}' in {} cache: {}", key, name, e);
                    } else {
                        debug!("Refreshed stale '{}' in {} cache", key, name);
                    }
                }
                Err(e) => warn!("Background refresh of '{}' in {} cache failed: {:#}", key, name, e),
            }
        });
    }

    // == Warmup ==
    /// Preloads every key not already cached, fetching concurrently.
    ///
    /// A failing fetcher is logged and counted; it never aborts the batch.
    pub async fn warmup<I, K, F, Fut, T>(&self, keys: I, fetcher: F, options: &CacheOptions) -> WarmupReport
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let (cached, pending): (Vec<String>, Vec<String>) = {
            let store = self.store.read().await;
            keys.into_iter()
                .map(|key: K| key.into())
                .partition(|key: &String| store.contains(key))
        };

        let tasks = pending
            .into_iter()
            .map(|key| {
                let fetch = fetcher(key.clone());
                WarmupTask::new(key, options.clone(), fetch)
            })
            .collect();
        let report = WarmupReport {
            skipped: cached.len(),
            ..WarmupReport::default()
        };
        self.run_warmup_batch(tasks, report).await
    }

    /// Runs heterogeneous warmup tasks concurrently, skipping keys already cached.
    pub async fn warmup_tasks(&self, tasks: Vec<WarmupTask>) -> WarmupReport {
        let mut report = WarmupReport::default();

        let pending: Vec<WarmupTask> = {
            let store = self.store.read().await;
            tasks
                .into_iter()
                .filter(|task| {
                    let cached = store.contains(&task.key);
                    if cached {
                        report.skipped += 1;
                    }
                    !cached
                })
                .collect()
        };

        self.run_warmup_batch(pending, report).await
    }

    /// Fetches and stores `pending` concurrently, adding the outcomes to `report`.
    async fn run_warmup_batch(&self, pending: Vec<WarmupTask>, mut report: WarmupReport) -> WarmupReport {
        let outcomes = join_all(pending.into_iter().map(|task| self.run_warmup_task(task))).await;
        for loaded in outcomes {
            if loaded {
                report.loaded += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "Warmed {} cache: {} loaded, {} skipped, {} failed",
            self.name, report.loaded, report.skipped, report.failed
        );
        report
    }

    async fn run_warmup_task(&self, task: WarmupTask) -> bool {
        let WarmupTask { key, options, fetch } = task;
        let value = match fetch.await {
            Ok(value) => value,
            Err(e) => {
                warn!("Warmup of '{}' in {} cache failed: {:#}", key, self.name, e);
                return false;
            }
        };

        match self.store.write().await.set_value(&key, value, &options) {
            Ok(()) => true,
            Err(e) => {
                warn!("Warmup of '{}' in {} cache could not be stored: {}", key, self.name, e);
                false
            }
        }
    }
}

impl fmt::Debug for CacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheService")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Marks a key as being refreshed; clears the mark on drop, including when
/// the refresh task panics.
struct RevalidationGuard {
    inflight: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl RevalidationGuard {
    fn acquire(inflight: &Arc<Mutex<HashSet<String>>>, key: &str) -> Option<Self> {
        let inserted = inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
        inserted.then(|| Self {
            inflight: Arc::clone(inflight),
            key: key.to_string(),
        })
    }
}

impl Drop for RevalidationGuard {
    fn drop(&mut self) {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn service() -> CacheService {
        CacheService::new("test", CacheStore::new(100, 1024))
    }

    fn swr() -> SwrOptions {
        SwrOptions::new(Duration::from_millis(100), Duration::from_millis(1000))
    }

    async fn backdate(service: &CacheService, key: &str, by_ms: u64) {
        service.store.write().await.backdate(key, by_ms);
    }

    /// Factory returning `value` and counting its invocations.
    fn counting(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnOnce() -> futures::future::Ready<anyhow::Result<String>> + Send + 'static {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(value.to_string()))
        }
    }

    async fn wait_for(calls: &Arc<AtomicUsize>, expected: usize) {
        for _ in 0..100 {
            if calls.load(Ordering::SeqCst) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_memoize_computes_once() {
        let cache = service();
        let calls = Arc::new(AtomicUsize::new(0));

        let first: String = cache
            .memoize("k", counting(&calls, "v"), &CacheOptions::default())
            .await
            .unwrap();
        let second: String = cache
            .memoize("k", counting(&calls, "other"), &CacheOptions::default())
            .await
            .unwrap();

        assert_eq!(first, "v");
        assert_eq!(second, "v");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memoize_propagates_factory_error() {
        let cache = service();

        let result: Result<String> = cache
            .memoize(
                "k",
                || async { Err(anyhow::anyhow!("database unavailable")) },
                &CacheOptions::default(),
            )
            .await;

        assert!(matches!(result, Err(CacheError::Fetch(_))));
        assert!(!cache.contains("k").await);
    }

    #[tokio::test]
    async fn test_memoize_recomputes_after_expiry() {
        let cache = service();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = CacheOptions::new().ttl(Duration::from_millis(100));

        let _: String = cache.memoize("k", counting(&calls, "v1"), &options).await.unwrap();
        backdate(&cache, "k", 500).await;
        let value: String = cache.memoize("k", counting(&calls, "v2"), &options).await.unwrap();

        assert_eq!(value, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_swr_fresh_band_skips_factory() {
        let cache = service();
        let calls = Arc::new(AtomicUsize::new(0));

        let _: String = cache
            .stale_while_revalidate("k", counting(&calls, "old"), swr())
            .await
            .unwrap();
        backdate(&cache, "k", 50).await;

        let value: String = cache
            .stale_while_revalidate("k", counting(&calls, "new"), swr())
            .await
            .unwrap();

        assert_eq!(value, "old");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_swr_stale_band_serves_old_and_refreshes() {
        let cache = service();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", "old", &swr().store_options()).await.unwrap();
        backdate(&cache, "k", 500).await;

        let value: String = cache
            .stale_while_revalidate("k", counting(&calls, "new"), swr())
            .await
            .unwrap();
        assert_eq!(value, "old");

        wait_for(&calls, 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get::<String>("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_swr_expired_band_awaits_factory() {
        let cache = service();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.set("k", "old", &swr().store_options()).await.unwrap();
        backdate(&cache, "k", 1500).await;

        let value: String = cache
            .stale_while_revalidate("k", counting(&calls, "new"), swr())
            .await
            .unwrap();

        assert_eq!(value, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_swr_background_failure_keeps_stale_value() {
        let cache = service();
        cache.set("k", "old", &swr().store_options()).await.unwrap();
        backdate(&cache, "k", 500).await;

        let value: String = cache
            .stale_while_revalidate(
                "k",
                || async { Err(anyhow::anyhow!("upstream timeout")) },
                swr(),
            )
            .await
            .unwrap();
        assert_eq!(value, "old");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.contains("k").await);
        assert!(cache.revalidating.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_swr_single_background_refresh_per_key() {
        let cache = service();
        cache.set("k", "old", &swr().store_options()).await.unwrap();
        backdate(&cache, "k", 500).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let release = Arc::clone(&release);
            let value: String = cache
                .stale_while_revalidate(
                    "k",
                    move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        Ok("new".to_string())
                    },
                    swr(),
                )
                .await
                .unwrap();
            assert_eq!(value, "old");
        }

        wait_for(&calls, 1).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        release.notify_waiters();
    }

    #[tokio::test]
    async fn test_swr_rejects_inverted_bands() {
        let cache = service();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = SwrOptions::new(Duration::from_secs(10), Duration::from_secs(1));

        let result: Result<String> = cache
            .stale_while_revalidate("k", counting(&calls, "v"), options)
            .await;

        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_swr_miss_propagates_factory_error() {
        let cache = service();
        let result: Result<String> = cache
            .stale_while_revalidate(
                "k",
                || async { Err(anyhow::anyhow!("not found upstream")) },
                swr(),
            )
            .await;

        assert!(matches!(result, Err(CacheError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_swr_refresh_discarded_after_invalidation() {
        let cache = service();
        let gate = Arc::new(Notify::new());
        cache.set("k", "old", &swr().store_options()).await.unwrap();
        backdate(&cache, "k", 500).await;

        let release = Arc::clone(&gate);
        let value: String = cache
            .stale_while_revalidate(
                "k",
                move || async move {
                    release.notified().await;
                    Ok("refreshed".to_string())
                },
                swr(),
            )
            .await
            .unwrap();
        assert_eq!(value, "old");

        cache.invalidate("k").await;
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get::<String>("k").await, None);
    }

    #[tokio::test]
    async fn test_swr_shape_mismatch_counts_as_miss() {
        let cache = service();
        cache.set("k", &vec!["x"], &swr().store_options()).await.unwrap();

        let value: u32 = cache
            .stale_while_revalidate("k", || async { Ok(7) }, swr())
            .await
            .unwrap();

        assert_eq!(value, 7);
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(cache.get::<u32>("k").await, Some(7));
    }

    #[tokio::test]
    async fn test_warmup_partial_failure() {
        let cache = service();

        let report = cache
            .warmup(
                ["a", "b", "c"],
                |key| async move {
                    if key == "b" {
                        Err(anyhow::anyhow!("fetch for {} failed", key))
                    } else {
                        Ok(format!("value-{}", key))
                    }
                },
                &CacheOptions::default(),
            )
            .await;

        assert_eq!(report.loaded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(cache.get::<String>("a").await.as_deref(), Some("value-a"));
        assert_eq!(cache.get::<String>("c").await.as_deref(), Some("value-c"));
        assert!(!cache.contains("b").await);
    }

    #[tokio::test]
    async fn test_warmup_skips_cached_keys() {
        let cache = service();
        cache.set("a", "existing", &CacheOptions::default()).await.unwrap();

        let report = cache
            .warmup(
                vec!["a".to_string(), "b".to_string()],
                |key| async move { Ok(format!("fetched-{}", key)) },
                &CacheOptions::default(),
            )
            .await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(cache.get::<String>("a").await.as_deref(), Some("existing"));
    }

    #[tokio::test]
    async fn test_warmup_fetcher_not_called_for_cached_keys() {
        let cache = service();
        cache.set("a", "existing", &CacheOptions::default()).await.unwrap();
        let invocations = AtomicUsize::new(0);

        let report = cache
            .warmup(
                ["a", "b"],
                |key| {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(key) }
                },
                &CacheOptions::default(),
            )
            .await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_warmup_runs_fetchers_concurrently() {
        let cache = service();
        let started = std::time::Instant::now();

        cache
            .warmup(
                ["a", "b", "c", "d"],
                |key| async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(key)
                },
                &CacheOptions::default(),
            )
            .await;

        assert!(started.elapsed() < Duration::from_millis(350));
        assert_eq!(cache.len().await, 4);
    }
}
