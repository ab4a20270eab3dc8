//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage with TTL expiration,
//! priority-aware LRU eviction, tag invalidation and optional compression.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::eviction::select_victim;
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::cache::{current_timestamp_ms, CacheEntry, CacheOptions, Priority};
use crate::config::DomainConfig;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded key-value store for JSON values.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Hit/miss/eviction counters
    counters: StatsCounters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Serialized size above which compressible values are encoded
    compression_threshold: usize,
    /// Monotonic access sequence, bumped on every write and hit
    sequence: u64,
    /// Bumped by every invalidation, so in-flight refreshes can tell their
    /// result is outdated
    invalidation_epoch: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries the cache can hold
    /// * `compression_threshold` - Bytes above which `compress` takes effect
    pub fn new(max_size: usize, compression_threshold: usize) -> Self {
        Self {
            entries: HashMap::new(),
            counters: StatsCounters::new(),
            max_size,
            compression_threshold,
            sequence: 0,
            invalidation_epoch: 0,
        }
    }

    pub fn from_config(config: &DomainConfig) -> Self {
        Self::new(config.max_size, config.compression_threshold)
    }

    // == Set ==
    /// Stores a JSON value under `key`.
    ///
    /// Expired entries are purged first. If the key is new and the store is
    /// still at capacity, exactly one entry is evicted. Overwriting resets
    /// the entry's timestamp and access stats.
    pub fn set_value(&mut self, key: &str, data: Value, options: &CacheOptions) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if self.max_size == 0 {
            debug!("Cache has zero capacity, dropping '{}'", key);
            return Ok(());
        }

        let now = current_timestamp_ms();
        let seq = self.next_seq();
        let entry = CacheEntry::new(data, options, self.compression_threshold, now, seq)?;

        self.cleanup();

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_size {
            self.evict_one();
        }

        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Serializes `data` and stores it under `key`.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        data: &T,
        options: &CacheOptions,
    ) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.set_value(key, value, options)
    }

    // == Get ==
    /// Retrieves the JSON value stored under `key`.
    ///
    /// Absent and expired keys count as misses; expired entries are removed.
    /// A payload that fails to decode is removed and reported as not found.
    pub fn get_value(&mut self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.counters.record_miss();
                debug!("Cache miss: '{}'", key);
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.counters.record_miss();
            debug!("Cache miss (expired): '{}'", key);
            return None;
        }

        self.take_hit(key, now)
    }

    /// Retrieves and deserializes the value stored under `key`.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Cached value for '{}' has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    // == Lookup Within ==
    /// Reads an entry only if it is younger than `max_age_ms`, returning its
    /// age alongside the value.
    ///
    /// Entries at or past `max_age_ms` (or past their own TTL) are removed and
    /// counted as misses.
    pub fn lookup_within(&mut self, key: &str, max_age_ms: u64) -> Option<(u64, Value)> {
        let now = current_timestamp_ms();
        let age = match self.entries.get(key) {
            Some(entry) if entry.age_at(now) < max_age_ms && !entry.is_expired_at(now) => {
                entry.age_at(now)
            }
            Some(_) => {
                self.entries.remove(key);
                self.counters.record_miss();
                debug!("Cache miss (past freshness window): '{}'", key);
                return None;
            }
            None => {
                self.counters.record_miss();
                debug!("Cache miss: '{}'", key);
                return None;
            }
        };

        self.take_hit(key, now).map(|value| (age, value))
    }

    // == Contains ==
    /// True if `key` holds an unexpired entry. Does not touch stats.
    pub fn contains(&self, key: &str) -> bool {
        let now = current_timestamp_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Invalidate ==
    /// Removes an entry by key, returning whether it existed.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.invalidation_epoch += 1;
        self.entries.remove(key).is_some()
    }

    // == Invalidate By Tag ==
    /// Removes every entry carrying `tag`, returning the number removed.
    pub fn invalidate_by_tag(&mut self, tag: &str) -> usize {
        self.invalidation_epoch += 1;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.has_tag(tag));
        before - self.entries.len()
    }

    // == Clear ==
    /// Drops all entries and resets the counters.
    pub fn clear(&mut self) {
        self.invalidation_epoch += 1;
        self.entries.clear();
        self.counters.reset();
    }

    /// Counter advanced by `invalidate`, `invalidate_by_tag` and `clear`.
    pub fn invalidation_epoch(&self) -> u64 {
        self.invalidation_epoch
    }

    /// Drops an entry whose value was read but could not be used by the
    /// caller, and counts the read as a miss.
    pub fn discard_unusable(&mut self, key: &str) {
        self.entries.remove(key);
        self.counters.record_miss();
        debug!("Discarded unusable entry '{}'", key);
    }

    // == Cleanup ==
    /// Removes all expired entries, returning the number removed.
    pub fn cleanup(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp_ms();
        let mut stats = CacheStats::from_counters(&self.counters, self.max_size);
        stats.size = self.entries.len();

        for entry in self.entries.values() {
            match entry.priority {
                Priority::Low => stats.priority_distribution.low += 1,
                Priority::Normal => stats.priority_distribution.normal += 1,
                Priority::High => stats.priority_distribution.high += 1,
            }
            if entry.is_expired_at(now) {
                stats.expired_entries += 1;
            }
            stats.memory_usage += entry.size_estimate();
        }

        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Shifts an entry's timestamps into the past.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, key: &str, by_ms: u64) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.timestamp = entry.timestamp.saturating_sub(by_ms);
            entry.last_accessed = entry.last_accessed.saturating_sub(by_ms);
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Hit path for a present, unexpired entry: bookkeeping first, then decode.
    fn take_hit(&mut self, key: &str, now: u64) -> Option<Value> {
        let seq = self.next_seq();
        let entry = self.entries.get_mut(key)?;
        entry.record_access(now, seq);
        self.counters.record_hit();
        debug!("Cache hit: '{}' (accesses: {})", key, entry.access_count);

        match entry.decoded() {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Failed to decode cached entry '{}': {}", key, e);
                self.entries.remove(key);
                None
            }
        }
    }

    fn evict_one(&mut self) {
        if let Some(victim) = select_victim(&self.entries) {
            self.entries.remove(&victim);
            self.counters.record_eviction();
            debug!("Evicted '{}' at capacity {}", victim, self.max_size);
        }
    }
}
