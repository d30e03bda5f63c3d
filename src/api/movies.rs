use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::validation::{
    MOVIE_FILTERS, json_body, validate_list_query, validate_movie_create, validate_movie_update,
    validate_path_id,
};
use super::types::{ErrorResponse, ValidationErrorResponse};
use super::{ApiError, AppState, auth::AuthUser};
use crate::domain::{Movie, MovieId, MovieView, Paginated};

/// POST /api/movie
#[utoipa::path(
    post,
    path = "/api/movie",
    tag = "Movie",
    security(("bearer" = [])),
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({
            "director": "Sofia Coppola",
            "name": "Lost in Translation",
            "genre": "Drama",
            "actors": "Bill Murray, Scarlett Johansson"
        })
    ),
    responses(
        (status = 201, description = "Movie created", body = MovieView),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, description = "Caller is not an administrator", body = ErrorResponse)
    )
)]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MovieView>), ApiError> {
    auth.require_admin()?;

    let input = validate_movie_create(&json_body(body)?)?;
    let movie = state.movies().create(input, auth.id).await?;

    Ok((StatusCode::CREATED, Json(movie)))
}

/// GET /api/movie
#[utoipa::path(
    get,
    path = "/api/movie",
    tag = "Movie",
    security(("bearer" = [])),
    params(
        ("director" = Option<String>, Query),
        ("name" = Option<String>, Query),
        ("genre" = Option<String>, Query),
        ("actors" = Option<String>, Query),
        ("created_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("updated_at" = Option<String>, Query, description = "YYYY-MM-DD"),
        ("page" = Option<u64>, Query),
        ("size" = Option<u64>, Query, maximum = 100),
        ("sortParam" = Option<String>, Query),
        ("sortOrder" = Option<String>, Query, description = "ASC or DESC")
    ),
    responses(
        (status = 200, description = "Movies with their votes", body = Paginated<MovieView>),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, body = ErrorResponse)
    )
)]
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<MovieView>>, ApiError> {
    let query = validate_list_query(params, MOVIE_FILTERS, Movie::FIELDS)?;

    Ok(Json(state.movies().get_all(&query).await?))
}

/// GET /api/movie/{id}
#[utoipa::path(
    get,
    path = "/api/movie/{id}",
    tag = "Movie",
    security(("bearer" = [])),
    params(("id" = MovieId, Path)),
    responses(
        (status = 200, body = MovieView),
        (status = 400, description = "Malformed id", body = ValidationErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MovieView>, ApiError> {
    let id: MovieId = validate_path_id(&id)?;

    Ok(Json(state.movies().find_by_id(id).await?))
}

/// PUT /api/movie/{id}
#[utoipa::path(
    put,
    path = "/api/movie/{id}",
    tag = "Movie",
    security(("bearer" = [])),
    params(("id" = MovieId, Path)),
    request_body(
        content = Value,
        content_type = "application/json",
        example = json!({"genre": "Comedy"})
    ),
    responses(
        (status = 200, description = "Updated movie", body = MovieView),
        (status = 400, body = ValidationErrorResponse),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MovieView>, ApiError> {
    auth.require_admin()?;

    let id: MovieId = validate_path_id(&id)?;
    let changes = validate_movie_update(&json_body(body)?)?;

    Ok(Json(state.movies().update(id, changes, auth.id).await?))
}

/// DELETE /api/movie/{id}
#[utoipa::path(
    delete,
    path = "/api/movie/{id}",
    tag = "Movie",
    security(("bearer" = [])),
    params(("id" = MovieId, Path)),
    responses(
        (status = 204, description = "Movie and its votes removed"),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn remove_movie(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    let id: MovieId = validate_path_id(&id)?;
    state.movies().remove(id, auth.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
