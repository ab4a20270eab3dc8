//! Eviction Module
//!
//! Priority-aware LRU victim selection.
//!
//! Entries are ordered by `(priority rank, last_accessed, access_seq)`:
//! - lowest priority class first
//! - within a class, least recently accessed first
//! - `access_seq` breaks ties inside the same millisecond

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Sort key of an entry in eviction order. Smallest is evicted first.
pub fn eviction_rank(entry: &CacheEntry) -> (u8, u64, u64) {
    (entry.priority.rank(), entry.last_accessed, entry.access_seq)
}

// == Select Victim ==
/// Returns the key of the entry to evict, or None if there are no entries.
pub fn select_victim(entries: &HashMap<String, CacheEntry>) -> Option<String> {
    entries
        .iter()
        .min_by_key(|(_, entry)| eviction_rank(entry))
        .map(|(key, _)| key.clone())
}
