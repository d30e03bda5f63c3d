use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::validation::{
    USER_FILTERS, json_body, validate_list_query, validate_user_create, validate_user_update,
};
use super::types::{ErrorResponse, ValidationErrorResponse};
use super::{ApiError, AppState, auth::AuthUser};
use crate::domain::{Paginated, User, UserRecord};

/// POST /api/user
#[utoipa::path(
    post,
    path = "/api/user",
    tag = "User",
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"name": "Ann", "email": "ann@movies.io", "password": "secret123"})
    ),
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid body or email taken", body = ValidationErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let input = validate_user_create(&json_body(body)?)?;
    let user = state.users().create(input).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/admin
#[utoipa::path(
    post,
    path = "/api/admin",
    tag = "User",
    security(("bearer" = [])),
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"name": "Root", "email": "root@movies.io", "password": "secret123"})
    ),
    responses(
        (status = 201, description = "Administrator created", body = User),
        (status = 400, description = "Invalid body or email taken", body = ValidationErrorResponse),
        (status = 401, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    auth.require_admin()?;

    let mut input = validate_user_create(&json_body(body)?)?;
    input.is_admin = true;
    let user = state.users().create(input).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/user/profile
#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "User",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's account", body = User),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users().find_by_id(auth.id).await?))
}

/// GET /api/user/list
#[utoipa::path(
    get,
    path = "/api/user/list",
    tag = "User",
    security(("bearer" = [])),
    params(
        ("name" = Option<String>, Query),
        ("email" = Option<String>, Query),
        ("created_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("updated_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("page" = Option<u64>, Query),
        ("size" = Option<u64>, Query, maximum = 100),
        ("sortParam" = Option<String>, Query),
        ("sortOrder" = Option<String>, Query, description = "ASC or DESC")
    ),
    responses(
        (status = 200, description = "Regular accounts", body = Paginated<User>),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let query = validate_list_query(params, USER_FILTERS, UserRecord::FIELDS)?
        .with("is_admin", "false");

    Ok(Json(state.users().get_all(&query).await?))
}

/// GET /api/user/list/admin
#[utoipa::path(
    get,
    path = "/api/user/list/admin",
    tag = "User",
    security(("bearer" = [])),
    params(
        ("name" = Option<String>, Query),
        ("email" = Option<String>, Query),
        ("created_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("updated_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("page" = Option<u64>, Query),
        ("size" = Option<u64>, Query, maximum = 100),
        ("sortParam" = Option<String>, Query),
        ("sortOrder" = Option<String>, Query, description = "ASC or DESC")
    ),
    responses(
        (status = 200, description = "Administrator accounts", body = Paginated<User>),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<User>>, ApiError> {
    auth.require_admin()?;

    let query = validate_list_query(params, USER_FILTERS, UserRecord::FIELDS)?
        .with("is_admin", "true");

    Ok(Json(state.users().get_all(&query).await?))
}

/// PUT /api/user
#[utoipa::path(
    put,
    path = "/api/user",
    tag = "User",
    security(("bearer" = [])),
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"name": "Ann B."})
    ),
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let changes = validate_user_update(&json_body(body)?)?;

    Ok(Json(state.users().update(auth.id, changes).await?))
}

/// PATCH /api/user/activate
#[utoipa::path(
    patch,
    path = "/api/user/activate",
    tag = "User",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Reactivated account", body = User),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users().activate(auth.id).await?))
}

/// PATCH /api/user/inactivate
#[utoipa::path(
    patch,
    path = "/api/user/inactivate",
    tag = "User",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn inactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    state.users().inactivate(auth.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
