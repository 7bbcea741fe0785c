use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use reaparr_core::{SanitizedConfig, SessionStats, SweepStatus};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SweepStatus> {
    Json(state.orchestrator().status())
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<SessionStats> {
    Json(state.orchestrator().session_stats().await)
}

pub async fn reset_stats(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().reset_session_stats().await;
    Json(MessageResponse {
        message: "Session statistics reset".to_string(),
    })
}

/// Kicks off a sweep cycle in the background. The orchestrator's internal
/// lock keeps it from overlapping a scheduled cycle.
pub async fn trigger_sweep(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<MessageResponse>) {
    let orchestrator = Arc::clone(state.orchestrator());
    tokio::spawn(async move {
        orchestrator.run_cycle().await;
    });
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "Sweep cycle started".to_string(),
        }),
    )
}

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::collect_dynamic_metrics(&state);
    crate::metrics::encode_metrics()
}
