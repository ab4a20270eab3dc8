//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DomainStatsResponse, HealthResponse, InvalidateRequest, InvalidationTarget,
    RemovedResponse, StatsResponse, UserWarmupResponse,
};
use crate::registry::{CacheDomain, CacheRegistry};
use crate::runtime::CacheRuntime;
use crate::warmup::{CacheInitializer, InitializationSummary};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: CacheRegistry,
    pub initializer: Arc<CacheInitializer>,
}

impl AppState {
    pub fn new(registry: CacheRegistry, initializer: Arc<CacheInitializer>) -> Self {
        Self {
            registry,
            initializer,
        }
    }

    pub fn from_runtime(runtime: &CacheRuntime) -> Self {
        Self::new(runtime.registry().clone(), Arc::clone(runtime.initializer()))
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.initializer.is_initialized()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        domains: state.registry.stats().await,
    })
}

/// Handler for GET /stats/:domain
pub async fn domain_stats_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<DomainStatsResponse>> {
    let domain: CacheDomain = domain.parse()?;
    let stats = state.registry.domain(domain).stats().await;

    Ok(Json(DomainStatsResponse {
        domain: domain.to_string(),
        stats,
    }))
}

/// Handler for POST /cache/:domain/invalidate
///
/// A malformed body is reported as 400 rather than axum's default rejection.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    payload: std::result::Result<Json<InvalidateRequest>, JsonRejection>,
) -> Result<Json<RemovedResponse>> {
    let domain: CacheDomain = domain.parse()?;
    let Json(req) = payload.map_err(|e| CacheError::InvalidRequest(e.body_text()))?;
    let cache = state.registry.domain(domain);

    let removed = match req.into_target()? {
        InvalidationTarget::Key(key) => usize::from(cache.invalidate(&key).await),
        InvalidationTarget::Tag(tag) => cache.invalidate_by_tag(&tag).await,
    };

    Ok(Json(RemovedResponse::new(domain.as_str(), removed)))
}

/// Handler for POST /cache/:domain/cleanup
pub async fn cleanup_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<RemovedResponse>> {
    let domain: CacheDomain = domain.parse()?;
    let removed = state.registry.domain(domain).cleanup().await;

    Ok(Json(RemovedResponse::new(domain.as_str(), removed)))
}

/// Handler for DELETE /cache/:domain
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<ClearResponse>> {
    let domain: CacheDomain = domain.parse()?;
    state.registry.domain(domain).clear().await;
    info!("Cleared {} cache via admin API", domain);

    Ok(Json(ClearResponse::new(domain.as_str())))
}

/// Handler for POST /warmup
///
/// Waits for initialization, joining a run already in progress.
pub async fn warmup_handler(State(state): State<AppState>) -> Json<InitializationSummary> {
    Json(state.initializer.initialize().await.clone())
}

/// Handler for POST /warmup/users/:user_id
pub async fn user_warmup_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserWarmupResponse>> {
    let report = state
        .initializer
        .warmup_user_specific_cache(&user_id)
        .await?;

    Ok(Json(UserWarmupResponse { user_id, report }))
}

/// Handler for DELETE /warmup/users/:user_id
pub async fn user_invalidate_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<RemovedResponse>> {
    let removed = state.initializer.invalidate_user_cache(&user_id).await?;

    Ok(Json(RemovedResponse::new(CacheDomain::General.as_str(), removed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheOptions;
    use crate::config::WarmupConfig;
    use crate::warmup::testing::MockSource;

    fn state() -> AppState {
        let registry = CacheRegistry::default();
        let initializer = CacheInitializer::with_default_warmers(
            registry.clone(),
            Arc::new(MockSource::default()),
            &WarmupConfig::default(),
        );
        AppState::new(registry, Arc::new(initializer))
    }

    #[tokio::test]
    async fn test_health_reports_initialization() {
        let state = state();

        let Json(before) = health_handler(State(state.clone())).await;
        assert!(!before.initialized);

        state.initializer.initialize().await;
        let Json(after) = health_handler(State(state)).await;
        assert!(after.initialized);
    }

    #[tokio::test]
    async fn test_invalidate_by_tag() {
        let state = state();
        let tagged = CacheOptions::new().tag("featured");
        state.registry.business().set("a", &1, &tagged).await.unwrap();
        state.registry.business().set("b", &2, &tagged).await.unwrap();

        let body = InvalidateRequest {
            key: None,
            tag: Some("featured".to_string()),
        };
        let Json(resp) = invalidate_handler(
            State(state.clone()),
            Path("business".to_string()),
            Ok(Json(body)),
        )
        .await
        .unwrap();

        assert_eq!(resp.removed, 2);
        assert!(state.registry.business().is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_missing_key_removes_nothing() {
        let body = InvalidateRequest {
            key: Some("absent".to_string()),
            tag: None,
        };
        let Json(resp) = invalidate_handler(State(state()), Path("ai".to_string()), Ok(Json(body)))
            .await
            .unwrap();

        assert_eq!(resp.removed, 0);
        assert_eq!(resp.domain, "ai");
    }

    #[tokio::test]
    async fn test_unknown_domain() {
        let result = domain_stats_handler(State(state()), Path("reviews".to_string())).await;
        assert!(matches!(result, Err(CacheError::UnknownDomain(_))));
    }

    #[tokio::test]
    async fn test_user_warmup_handler() {
        let Json(resp) = user_warmup_handler(State(state()), Path("u7".to_string()))
            .await
            .unwrap();

        assert_eq!(resp.user_id, "u7");
        assert_eq!(resp.report.loaded, 3);
    }
}
