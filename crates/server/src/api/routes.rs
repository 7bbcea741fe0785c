use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::metrics_middleware;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Sweeper
        .route("/status", get(handlers::get_status))
        .route("/stats", get(handlers::get_stats))
        .route("/stats/reset", post(handlers::reset_stats))
        .route("/sweep", post(handlers::trigger_sweep))
        .with_state(Arc::clone(&state));

    // Prometheus scrape endpoint, outside the /api/v1 prefix
    let metrics_route = Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(metrics_route)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
