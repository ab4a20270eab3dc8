//! Cache Entry Module
//!
//! Defines the unit of storage: a JSON value plus expiry, priority, tag and
//! access metadata.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::cache::codec;
use crate::cache::options::{CacheOptions, Priority};
use crate::error::{CacheError, Result};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value; an encoded string when `compressed` is set
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Milliseconds until expiry, relative to `timestamp`
    pub ttl: u64,
    /// Eviction class
    pub priority: Priority,
    /// Invalidation labels
    pub tags: HashSet<String>,
    /// Number of successful reads
    pub access_count: u64,
    /// Timestamp of the most recent read (Unix milliseconds)
    pub last_accessed: u64,
    /// Store-wide sequence number of the most recent write or read
    pub access_seq: u64,
    /// Whether `data` holds the encoded representation
    pub compressed: bool,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    ///
    /// The value is encoded when `options.compress` is set and its serialized
    /// size exceeds `compression_threshold`.
    pub fn new(
        data: Value,
        options: &CacheOptions,
        compression_threshold: usize,
        now: u64,
        seq: u64,
    ) -> Result<Self> {
        let (data, compressed) =
            if options.compress && codec::serialized_size(&data) > compression_threshold {
                (Value::String(codec::compress(&data)?), true)
            } else {
                (data, false)
            };

        Ok(Self {
            data,
            timestamp: now,
            ttl: duration_ms(options.ttl),
            priority: options.priority,
            tags: options.tags.iter().cloned().collect(),
            access_count: 0,
            last_accessed: now,
            access_seq: seq,
            compressed,
        })
    }

    // == Age ==
    /// Milliseconds since the entry was written.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Is Expired ==
    /// An entry is expired once strictly more than `ttl` ms have passed.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.age_at(now) > self.ttl
    }

    // == Record Access ==
    /// Access bookkeeping for a successful read.
    pub fn record_access(&mut self, now: u64, seq: u64) {
        self.access_count += 1;
        self.last_accessed = now;
        self.access_seq = seq;
    }

    // == Decode ==
    /// Returns the original value, decoding it if it was compressed.
    pub fn decoded(&self) -> Result<Value> {
        if !self.compressed {
            return Ok(self.data.clone());
        }
        match &self.data {
            Value::String(encoded) => codec::decompress(encoded),
            _ => Err(CacheError::Compression(
                "compressed entry does not hold an encoded string".to_string(),
            )),
        }
    }

    /// Approximate memory footprint of the stored data in bytes.
    pub fn size_estimate(&self) -> usize {
        codec::serialized_size(&self.data)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
