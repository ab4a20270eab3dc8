//! Response DTOs for the admin API

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{CacheStats, WarmupReport};

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether startup warmup has finished
    pub initialized: bool,
}

impl HealthResponse {
    pub fn healthy(initialized: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            initialized,
        }
    }
}

/// Response body for `GET /stats`, keyed by domain name
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub domains: BTreeMap<String, CacheStats>,
}

/// Response body for `GET /stats/:domain`
#[derive(Debug, Clone, Serialize)]
pub struct DomainStatsResponse {
    pub domain: String,
    #[serde(flatten)]
    pub stats: CacheStats,
}

/// Response body for invalidation and cleanup
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub domain: String,
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(domain: impl Into<String>, removed: usize) -> Self {
        Self {
            domain: domain.into(),
            removed,
        }
    }
}

/// Response body for `DELETE /cache/:domain`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub domain: String,
}

impl ClearResponse {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            message: format!("Cache '{}' cleared", domain),
            domain,
        }
    }
}

/// Response body for `POST /warmup/users/:user_id`
#[derive(Debug, Clone, Serialize)]
pub struct UserWarmupResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub report: WarmupReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_value(HealthResponse::healthy(true)).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["initialized"], true);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_domain_stats_flattened() {
        let resp = DomainStatsResponse {
            domain: "search".to_string(),
            stats: CacheStats::default(),
        };
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["domain"], "search");
        assert_eq!(json["hits"], 0);
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_user_warmup_flattened() {
        let resp = UserWarmupResponse {
            user_id: "u1".to_string(),
            report: WarmupReport {
                loaded: 3,
                skipped: 0,
                failed: 0,
            },
        };
        assert_eq!(
            serde_json::to_value(resp).unwrap(),
            json!({"user_id": "u1", "loaded": 3, "skipped": 0, "failed": 0})
        );
    }

    #[test]
    fn test_clear_response_message() {
        let resp = ClearResponse::new("ai");
        assert_eq!(resp.message, "Cache 'ai' cleared");
    }
}
