//! Named Cache Instances
//!
//! One independently sized cache per domain. Instances share the
//! implementation but no storage, so eviction and tag invalidation in one
//! domain never touch another.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::cache::{CacheService, CacheStats};
use crate::config::{Config, DomainConfig};
use crate::error::CacheError;

// == Cache Domain ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheDomain {
    General,
    Business,
    Search,
    Ai,
}

impl CacheDomain {
    pub const ALL: [CacheDomain; 4] = [
        CacheDomain::General,
        CacheDomain::Business,
        CacheDomain::Search,
        CacheDomain::Ai,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheDomain::General => "general",
            CacheDomain::Business => "business",
            CacheDomain::Search => "search",
            CacheDomain::Ai => "ai",
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheDomain {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(CacheDomain::General),
            "business" => Ok(CacheDomain::Business),
            "search" => Ok(CacheDomain::Search),
            "ai" => Ok(CacheDomain::Ai),
            _ => Err(CacheError::UnknownDomain(s.to_string())),
        }
    }
}

// == Cache Registry ==
/// The four named cache instances. Cloning shares the underlying stores.
#[derive(Debug, Clone)]
pub struct CacheRegistry {
    general: CacheService,
    business: CacheService,
    search: CacheService,
    ai: CacheService,
}

impl CacheRegistry {
    pub fn new(general: DomainConfig, business: DomainConfig, search: DomainConfig, ai: DomainConfig) -> Self {
        Self {
            general: CacheService::from_config(CacheDomain::General.as_str(), &general),
            business: CacheService::from_config(CacheDomain::Business.as_str(), &business),
            search: CacheService::from_config(CacheDomain::Search.as_str(), &search),
            ai: CacheService::from_config(CacheDomain::Ai.as_str(), &ai),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.general, config.business, config.search, config.ai)
    }

    pub fn domain(&self, domain: CacheDomain) -> &CacheService {
        match domain {
            CacheDomain::General => &self.general,
            CacheDomain::Business => &self.business,
            CacheDomain::Search => &self.search,
            CacheDomain::Ai => &self.ai,
        }
    }

    pub fn general(&self) -> &CacheService {
        &self.general
    }

    pub fn business(&self) -> &CacheService {
        &self.business
    }

    pub fn search(&self) -> &CacheService {
        &self.search
    }

    pub fn ai(&self) -> &CacheService {
        &self.ai
    }

    pub fn iter(&self) -> impl Iterator<Item = (CacheDomain, &CacheService)> {
        CacheDomain::ALL.into_iter().map(|d| (d, self.domain(d)))
    }

    /// Stats of every domain, keyed by domain name.
    pub async fn stats(&self) -> BTreeMap<String, CacheStats> {
        let mut all = BTreeMap::new();
        for (domain, cache) in self.iter() {
            all.insert(domain.to_string(), cache.stats().await);
        }
        all
    }

    /// Purges expired entries in every domain, returning the total removed.
    pub async fn cleanup_all(&self) -> usize {
        let mut removed = 0;
        for (_, cache) in self.iter() {
            removed += cache.cleanup().await;
        }
        removed
    }

    pub async fn clear_all(&self) {
        for (_, cache) in self.iter() {
            cache.clear().await;
        }
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
