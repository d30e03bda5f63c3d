//! OpenAPI description of the HTTP surface.
//!
//! The document is derived from the handler annotations and the response
//! types, so it cannot drift from the routes that are actually mounted.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::{movies, observability, sessions, system, users, votes};

#[derive(OpenApi)]
#[openapi(
    info(title = "API Movies", description = "Movie catalogue with user ratings from 0 to 4."),
    paths(
        users::create_user,
        users::create_admin,
        users::get_profile,
        users::list_users,
        users::list_admins,
        users::update_user,
        users::activate_user,
        users::inactivate_user,
        sessions::create_session,
        movies::create_movie,
        movies::list_movies,
        movies::get_movie,
        movies::update_movie,
        movies::remove_movie,
        votes::create_vote,
        votes::list_votes,
        votes::get_vote,
        votes::update_vote,
        votes::remove_vote,
        observability::get_metrics,
        system::health_live,
        system::health_ready,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "User", description = "Accounts and roles"),
        (name = "Session", description = "Login"),
        (name = "Movie", description = "Catalogue"),
        (name = "Vote", description = "Ratings"),
        (name = "System", description = "Health and metrics"),
    )
)]
pub struct ApiDoc;

/// Registers the `Authorization: Bearer <jwt>` scheme the protected routes name.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi
            .components
            .get_or_insert_with(Default::default)
            .add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
    }
}

/// GET /api/docs
pub async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_mounted_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/api/user",
            "/api/admin",
            "/api/user/profile",
            "/api/user/list",
            "/api/user/list/admin",
            "/api/user/activate",
            "/api/user/inactivate",
            "/api/sessions",
            "/api/movie",
            "/api/movie/{id}",
            "/api/vote",
            "/api/vote/{id}",
            "/api/metrics",
            "/api/health/live",
            "/api/health/ready",
        ] {
            assert!(paths.contains(&path), "missing {path}");
        }
    }

    #[test]
    fn document_declares_bearer_scheme_and_schemas() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();

        assert_eq!(json["info"]["title"], "API Movies");
        assert_eq!(
            json["components"]["securitySchemes"]["bearer"]["scheme"],
            "bearer"
        );
        let schemas = json["components"]["schemas"].as_object().unwrap();
        for name in ["User", "MovieView", "Vote", "Session", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
