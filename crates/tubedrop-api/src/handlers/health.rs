use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

#[derive(serde::Serialize)]
pub(crate) struct HealthCheckResponse {
    pub status: &'static str,
    pub storage: String,
    pub pending_downloads: usize,
}

/// Liveness check - process is running and reports what it is serving.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthCheckResponse {
            status: "healthy",
            storage: state.storage.backend_type().to_string(),
            pending_downloads: state.registry.pending_count().await,
        }),
    )
}
