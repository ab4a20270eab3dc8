//! Write Options Module
//!
//! Priority classes and the option bags accepted by `set` and
//! `stale_while_revalidate`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default TTL applied when a caller does not specify one (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Priority ==
/// Eviction class of an entry. Lower classes are evicted first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Rank used by the eviction order: low=0, normal=1, high=2.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Normal => 1,
            Priority::High => 2,
        }
    }
}

// == Cache Options ==
/// Options for a single `set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Time until the entry expires
    pub ttl: Duration,
    /// Eviction class
    pub priority: Priority,
    /// Invalidation labels
    pub tags: Vec<String>,
    /// Encode the value when its serialized size exceeds the store threshold
    pub compress: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            priority: Priority::Normal,
            tags: Vec::new(),
            compress: false,
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

// == Stale-While-Revalidate Options ==
/// Freshness bands for `stale_while_revalidate`.
///
/// An entry younger than `stale_ttl` is fresh; one between `stale_ttl` and
/// `fresh_ttl` is served and refreshed in the background; anything older is
/// refetched before returning. `fresh_ttl` must not be shorter than `stale_ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwrOptions {
    pub stale_ttl: Duration,
    pub fresh_ttl: Duration,
    pub priority: Priority,
    pub tags: Vec<String>,
}

impl SwrOptions {
    pub fn new(stale_ttl: Duration, fresh_ttl: Duration) -> Self {
        Self {
            stale_ttl,
            fresh_ttl,
            priority: Priority::Normal,
            tags: Vec::new(),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Options used when (re)storing the fetched value.
    pub fn store_options(&self) -> CacheOptions {
        CacheOptions {
            ttl: self.fresh_ttl,
            priority: self.priority,
            tags: self.tags.clone(),
            compress: false,
        }
    }
}
