use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use super::validation::{json_body, validate_session};
use super::types::{ErrorResponse, ValidationErrorResponse};
use super::{ApiError, AppState};
use crate::domain::Session;

/// POST /api/sessions
/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Session",
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"email": "ann@movies.io", "password": "secret123"})
    ),
    responses(
        (status = 201, description = "Signed-in user and bearer token", body = Session),
        (status = 400, description = "Invalid body or wrong password", body = ValidationErrorResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let (email, password) = validate_session(&json_body(body)?)?;
    let session = state.sessions().create(&email, &password).await?;

    tracing::info!(user_id = %session.user.id, "Session created");

    Ok((StatusCode::CREATED, Json(session)))
}
