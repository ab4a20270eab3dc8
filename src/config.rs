//! Configuration Module
//!
//! Handles loading cache, backend and warmup configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default compression threshold in bytes.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

/// Sizing for a single named cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainConfig {
    /// Maximum number of entries the instance can hold
    pub max_size: usize,
    /// Serialized size in bytes above which compressible values are encoded
    pub compression_threshold: usize,
}

impl DomainConfig {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self::new(100)
    }
}

/// What the warmup orchestrators preload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupConfig {
    /// Business categories preloaded into the business cache
    pub categories: Vec<String>,
    /// Popular free-text queries preloaded into the search cache
    pub search_queries: Vec<String>,
    /// Popular locations preloaded into the search cache
    pub search_locations: Vec<String>,
    /// Common questions whose AI answers are preloaded
    pub ai_queries: Vec<String>,
    /// Curated recommendation sets preloaded into the AI cache
    pub ai_recommendation_sets: Vec<String>,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            categories: to_strings(&[
                "restaurants",
                "retail",
                "professional-services",
                "health",
                "automotive",
                "home-services",
            ]),
            search_queries: to_strings(&["coffee", "plumber", "dentist", "pizza", "hair salon"]),
            search_locations: to_strings(&["downtown", "midtown", "uptown"]),
            ai_queries: to_strings(&[
                "best restaurants near me",
                "how do I claim my business",
                "open late tonight",
            ]),
            ai_recommendation_sets: to_strings(&["trending", "new-businesses", "top-rated"]),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP admin server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// General-purpose cache sizing
    pub general: DomainConfig,
    /// Business-domain cache sizing
    pub business: DomainConfig,
    /// Search-domain cache sizing
    pub search: DomainConfig,
    /// AI-domain cache sizing
    pub ai: DomainConfig,
    /// Base URL of the hosted backend
    pub backend_url: String,
    /// Per-request timeout for backend calls in seconds
    pub backend_timeout: u64,
    /// Warmup key lists
    pub warmup: WarmupConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `GENERAL_CACHE_SIZE`, `BUSINESS_CACHE_SIZE`, `SEARCH_CACHE_SIZE`,
    ///   `AI_CACHE_SIZE` - Per-domain capacities (defaults: 100, 200, 150, 50)
    /// - `COMPRESSION_THRESHOLD` - Bytes, shared by all domains (default: 1024)
    /// - `BACKEND_URL` - Hosted backend base URL
    /// - `BACKEND_TIMEOUT` - Backend request timeout in seconds (default: 10)
    /// - `WARMUP_CATEGORIES`, `WARMUP_SEARCH_QUERIES`, `WARMUP_SEARCH_LOCATIONS`,
    ///   `WARMUP_AI_QUERIES`, `WARMUP_AI_RECOMMENDATION_SETS` - Comma-separated lists
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let threshold = env_or("COMPRESSION_THRESHOLD", DEFAULT_COMPRESSION_THRESHOLD);
        let domain = |var: &str, fallback: DomainConfig| DomainConfig {
            max_size: env_or(var, fallback.max_size),
            compression_threshold: threshold,
        };

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            general: domain("GENERAL_CACHE_SIZE", defaults.general),
            business: domain("BUSINESS_CACHE_SIZE", defaults.business),
            search: domain("SEARCH_CACHE_SIZE", defaults.search),
            ai: domain("AI_CACHE_SIZE", defaults.ai),
            backend_url: env::var("BACKEND_URL").unwrap_or(defaults.backend_url),
            backend_timeout: env_or("BACKEND_TIMEOUT", defaults.backend_timeout),
            warmup: WarmupConfig {
                categories: env_list("WARMUP_CATEGORIES", defaults.warmup.categories),
                search_queries: env_list("WARMUP_SEARCH_QUERIES", defaults.warmup.search_queries),
                search_locations: env_list(
                    "WARMUP_SEARCH_LOCATIONS",
                    defaults.warmup.search_locations,
                ),
                ai_queries: env_list("WARMUP_AI_QUERIES", defaults.warmup.ai_queries),
                ai_recommendation_sets: env_list(
                    "WARMUP_AI_RECOMMENDATION_SETS",
                    defaults.warmup.ai_recommendation_sets,
                ),
            },
        }
    }

    /// Backend timeout as a Duration.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            general: DomainConfig::new(100),
            business: DomainConfig::new(200),
            search: DomainConfig::new(150),
            ai: DomainConfig::new(50),
            backend_url: "http://localhost:8080/api".to_string(),
            backend_timeout: 10,
            warmup: WarmupConfig::default(),
        }
    }
}

fn env_or<T: FromStr>(var: &str, fallback: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

fn env_list(var: &str, fallback: Vec<String>) -> Vec<String> {
    match env::var(var) {
        Ok(raw) => parse_list(&raw),
        Err(_) => fallback,
    }
}

/// Splits a comma-separated list, trimming whitespace and dropping empty items.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
