//! Cache Module
//!
//! In-memory caching with TTL expiration, priority-aware LRU eviction,
//! tag invalidation, compression, memoization, stale-while-revalidate and
//! batch warmup.

mod codec;
mod entry;
mod eviction;
mod options;
mod service;
mod stats;
mod store;
mod warmup;


// Re-export public types
pub use entry::{current_timestamp_ms, duration_ms, CacheEntry};
pub use eviction::{eviction_rank, select_victim};
pub use options::{CacheOptions, Priority, SwrOptions, DEFAULT_TTL};
pub use service::CacheService;
pub use stats::{CacheStats, PriorityDistribution, StatsCounters};
pub use store::CacheStore;
pub use warmup::{FetchFuture, WarmupReport, WarmupTask};
