use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::AppState;
use super::types::{HealthLiveResponse, HealthReadyResponse};

/// `GET /api/health/live`
///
/// Answers as long as the process is serving requests.
#[utoipa::path(
    get,
    path = "/api/health/live",
    tag = "System",
    responses((status = 200, body = HealthLiveResponse))
)]
pub async fn health_live() -> Json<HealthLiveResponse> {
    Json(HealthLiveResponse { status: "alive" })
}

/// `GET /api/health/ready`
///
/// Checks that the database answers a trivial query.
#[utoipa::path(
    get,
    path = "/api/health/ready",
    tag = "System",
    responses(
        (status = 200, description = "Ready to serve", body = HealthReadyResponse),
        (status = 503, description = "Database unreachable", body = HealthReadyResponse)
    )
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthReadyResponse {
            ready: database,
            database,
        }),
    )
}
