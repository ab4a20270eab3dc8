//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, domain_stats_handler, health_handler, invalidate_handler,
    stats_handler, user_invalidate_handler, user_warmup_handler, warmup_handler, AppState,
};

/// Creates the admin router with CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/:domain", get(domain_stats_handler))
        .route("/cache/:domain", delete(clear_handler))
        .route("/cache/:domain/invalidate", post(invalidate_handler))
        .route("/cache/:domain/cleanup", post(cleanup_handler))
        .route("/warmup", post(warmup_handler))
        .route(
            "/warmup/users/:user_id",
            post(user_warmup_handler).delete(user_invalidate_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
