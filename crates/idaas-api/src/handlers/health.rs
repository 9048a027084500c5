//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse, StoreHealthResponse};
use crate::state::AppState;

/// GET /health
///
/// Answers 503 while the credential store is unreachable.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let health = &state.stores.health;
    let (code, status, store_status) = match health.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "connected"),
        Err(e) => {
            tracing::warn!(backend = health.backend(), "Store health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: StoreHealthResponse {
            backend: health.backend(),
            status: store_status,
        },
        access_log_dropped: state.access_log.dropped(),
    };
    (code, Json(ApiResponse::ok(body)))
}
