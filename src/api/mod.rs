use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenManager;
use crate::config::Config;
use crate::db::Store;
use crate::services::{MovieService, SessionService, UserService, VoteService};
use crate::state::SharedState;

pub mod auth;
mod docs;
mod error;
mod movies;
mod observability;
mod sessions;
mod system;
mod types;
mod users;
pub mod validation;
mod votes;

pub use auth::AuthUser;
pub use docs::ApiDoc;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.shared.tokens
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserService {
        self.shared.users.as_ref()
    }

    #[must_use]
    pub fn movies(&self) -> &dyn MovieService {
        self.shared.movies.as_ref()
    }

    #[must_use]
    pub fn votes(&self) -> &dyn VoteService {
        self.shared.votes.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionService {
        self.shared.sessions.as_ref()
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .route("/", get(banner))
        .route("/user", post(users::create_user))
        .route("/sessions", post(sessions::create_session))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/docs", get(docs::get_openapi))
        .merge(protected_routes)
        .with_state(state);

    let cors_layer = if cors_origins.is_empty() || cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", post(users::create_admin))
        .route("/user", put(users::update_user))
        .route("/user/profile", get(users::get_profile))
        .route("/user/list", get(users::list_users))
        .route("/user/list/admin", get(users::list_admins))
        .route("/user/activate", patch(users::activate_user))
        .route("/user/inactivate", patch(users::inactivate_user))
        .route(
            "/movie",
            post(movies::create_movie).get(movies::list_movies),
        )
        .route(
            "/movie/{id}",
            get(movies::get_movie)
                .put(movies::update_movie)
                .delete(movies::remove_movie),
        )
        .route("/vote", post(votes::create_vote).get(votes::list_votes))
        .route(
            "/vote/{id}",
            get(votes::get_vote)
                .put(votes::update_vote)
                .delete(votes::remove_vote),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// GET /api
async fn banner() -> String {
    format!("API Movies {}", env!("CARGO_PKG_VERSION"))
}
