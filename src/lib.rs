//! Directory Cache - client-side caching for a business directory
//!
//! Named in-memory caches with TTL expiration, priority-aware LRU eviction,
//! tag invalidation and stale-while-revalidate, preloaded at startup by
//! per-domain warmers.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod runtime;
pub mod source;
pub mod tasks;
pub mod warmup;

pub use api::{create_router, AppState};
pub use cache::{CacheOptions, CacheService, CacheStats, Priority, SwrOptions};
pub use client::{ApiClient, ApiRequest, RequestCacheOptions, ReqwestTransport, Transport};
pub use config::Config;
pub use error::{CacheError, Result};
pub use registry::{CacheDomain, CacheRegistry};
pub use runtime::CacheRuntime;
pub use source::{DirectoryDataSource, RestDirectorySource};
pub use tasks::spawn_cleanup_task;
pub use warmup::{CacheInitializer, CacheWarmer, InitializationSummary};
