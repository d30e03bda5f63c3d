use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::validation::{
    VOTE_FILTERS, json_body, validate_list_query, validate_path_id, validate_vote_create,
    validate_vote_update,
};
use super::types::{ErrorResponse, ValidationErrorResponse};
use super::{ApiError, AppState, auth::AuthUser};
use crate::domain::{MovieId, NewVote, Paginated, UserId, Vote, VoteId, VoteUpdate};

/// POST /api/vote
///
/// The vote is always cast as the caller.
#[utoipa::path(
    post,
    path = "/api/vote",
    tag = "Vote",
    security(("bearer" = [])),
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"movie_id": "7f1c2b1e-3d4a-4c1e-9a55-0b6f3f0e2a11", "rating": 3})
    ),
    responses(
        (status = 201, description = "Vote cast", body = Vote),
        (status = 400, description = "Invalid body or movie already rated", body = ValidationErrorResponse),
        (status = 401, description = "Administrators cannot vote", body = ErrorResponse),
        (status = 404, description = "Unknown movie", body = ErrorResponse)
    )
)]
pub async fn create_vote(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vote>), ApiError> {
    auth.require_regular()?;

    let (movie_id, rating) = validate_vote_create(&json_body(body)?)?;
    let vote = state
        .votes()
        .create(NewVote {
            user_id: auth.id,
            movie_id,
            rating,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(vote)))
}

/// GET /api/vote
#[utoipa::path(
    get,
    path = "/api/vote",
    tag = "Vote",
    security(("bearer" = [])),
    params(
        ("movie_id" = Option<MovieId>, Query),
        ("user_id" = Option<UserId>, Query),
        ("rating" = Option<i32>, Query),
        ("created_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("updated_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("page" = Option<u64>, Query),
        ("size" = Option<u64>, Query, maximum = 100),
        ("sortParam" = Option<String>, Query),
        ("sortOrder" = Option<String>, Query, description = "ASC or DESC")
    ),
    responses(
        (status = 200, description = "Votes", body = Paginated<Vote>),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn list_votes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<Vote>>, ApiError> {
    let query = validate_list_query(params, VOTE_FILTERS, Vote::FIELDS)?;

    Ok(Json(state.votes().get_all(&query).await?))
}

/// GET /api/vote/{id}
#[utoipa::path(
    get,
    path = "/api/vote/{id}",
    tag = "Vote",
    security(("bearer" = [])),
    params(("id" = VoteId, Path)),
    responses(
        (status = 200, body = Vote),
        (status = 400, description = "Malformed id", body = ValidationErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_vote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vote>, ApiError> {
    let id: VoteId = validate_path_id(&id)?;

    Ok(Json(state.votes().find_by_id(id).await?))
}

/// PUT /api/vote/{id}
#[utoipa::path(
    put,
    path = "/api/vote/{id}",
    tag = "Vote",
    security(("bearer" = [])),
    params(("id" = VoteId, Path)),
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"rating": 4})
    ),
    responses(
        (status = 200, description = "Updated vote", body = Vote),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, description = "Not the owner", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_vote(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vote>, ApiError> {
    auth.require_regular()?;

    let id: VoteId = validate_path_id(&id)?;
    let rating = validate_vote_update(&json_body(body)?)?;
    let vote = state
        .votes()
        .update(
            id,
            VoteUpdate {
                user_id: auth.id,
                rating,
            },
        )
        .await?;

    Ok(Json(vote))
}

/// DELETE /api/vote/{id}
#[utoipa::path(
    delete,
    path = "/api/vote/{id}",
    tag = "Vote",
    security(("bearer" = [])),
    params(("id" = VoteId, Path)),
    responses(
        (status = 204, description = "Vote removed"),
        (status = 401, description = "Neither the owner nor an administrator", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn remove_vote(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: VoteId = validate_path_id(&id)?;
    state.votes().remove(id, auth.id, auth.is_admin).await?;

    Ok(StatusCode::NO_CONTENT)
}
