//! Warmup Task Module
//!
//! A warmup task pairs a cache key with the future that produces its value.

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CacheOptions;

/// Boxed fetcher future yielding the JSON value to cache.
pub type FetchFuture = BoxFuture<'static, anyhow::Result<Value>>;

// == Warmup Task ==
/// A cache key, its fetcher and the options used to store the result.
pub struct WarmupTask {
    pub key: String,
    pub options: CacheOptions,
    pub fetch: FetchFuture,
}

impl WarmupTask {
    pub fn new<T, Fut>(key: impl Into<String>, options: CacheOptions, fetch: Fut) -> Self
    where
        T: Serialize + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let fetch = async move {
            let value = fetch.await?;
            Ok(serde_json::to_value(value)?)
        }
        .boxed();

        Self {
            key: key.into(),
            options,
            fetch,
        }
    }
}

impl fmt::Debug for WarmupTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarmupTask")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// == Warmup Report ==
/// Outcome counts of one warmup batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmupReport {
    /// Keys fetched and stored
    pub loaded: usize,
    /// Keys already cached, not refetched
    pub skipped: usize,
    /// Keys whose fetcher (or store) failed
    pub failed: usize,
}

impl WarmupReport {
    pub fn total(&self) -> usize {
        self.loaded + self.skipped + self.failed
    }

    pub fn merge(&mut self, other: WarmupReport) {
        self.loaded += other.loaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}
