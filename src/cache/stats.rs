//! Cache Statistics Module
//!
//! Running hit/miss/eviction counters and the derived stats snapshot.

use serde::{Deserialize, Serialize};

// == Counters ==
/// Running performance counters owned by a store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted at capacity
    pub evictions: u64,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Number of stored entries per priority class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDistribution {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
}

// == Cache Stats ==
/// Point-in-time statistics of one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_requests: u64,
    pub hit_rate: f64,
    /// Current number of entries, including expired ones not yet purged
    pub size: usize,
    pub max_size: usize,
    pub priority_distribution: PriorityDistribution,
    /// Entries past their TTL that cleanup has not removed yet
    pub expired_entries: usize,
    /// Approximate bytes held by stored values
    pub memory_usage: usize,
}

impl CacheStats {
    /// Seeds a snapshot from the running counters.
    pub fn from_counters(counters: &StatsCounters, max_size: usize) -> Self {
        Self {
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            total_requests: counters.total_requests(),
            hit_rate: counters.hit_rate(),
            max_size,
            ..Self::default()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_new() {
        let counters = StatsCounters::new();
        assert_eq!(counters.hits, 0);
        assert_eq!(counters.misses, 0);
        assert_eq!(counters.evictions, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StatsCounters::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut counters = StatsCounters::new();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.total_requests(), 4);
        assert_eq!(counters.hit_rate(), 0.75);
    }

    #[test]
    fn test_reset() {
        let mut counters = StatsCounters::new();
        counters.record_hit();
        counters.record_eviction();
        counters.reset();
        assert_eq!(counters.total_requests(), 0);
        assert_eq!(counters.evictions, 0);
    }

    #[test]
    fn test_snapshot_from_counters() {
        let mut counters = StatsCounters::new();
        counters.record_hit();
        counters.record_miss();
        counters.record_eviction();

        let stats = CacheStats::from_counters(&counters, 50);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.hit_rate, 0.5);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.max_size, 50);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_snapshot_serializes_snake_case() {
        let json = serde_json::to_value(CacheStats::default()).unwrap();
        assert!(json.get("hit_rate").is_some());
        assert!(json["priority_distribution"].get("high").is_some());
    }
}
