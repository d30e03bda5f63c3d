use chrono::Duration;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenManager};
use crate::config::Config;
use crate::db::{MovieRepository, Store, UserRepository, VoteRepository};
use crate::services::{
    DefaultMovieService, DefaultSessionService, DefaultUserService, DefaultVoteService,
    MovieService, SessionService, UserService, VoteService,
};

/// Everything a request handler needs, wired once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenManager>,

    pub users: Arc<dyn UserService>,

    pub movies: Arc<dyn MovieService>,

    pub votes: Arc<dyn VoteService>,

    pub sessions: Arc<dyn SessionService>,
}

impl SharedState {
    /// Opens the database, applies migrations and builds the services over
    /// the `SeaORM` repositories.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let (user_repo, movie_repo, vote_repo) =
            (store.user_repo(), store.movie_repo(), store.vote_repo());

        Self::with_repositories(config, store, user_repo, movie_repo, vote_repo)
    }

    pub fn with_repositories(
        config: Config,
        store: Store,
        user_repo: Arc<dyn UserRepository>,
        movie_repo: Arc<dyn MovieRepository>,
        vote_repo: Arc<dyn VoteRepository>,
    ) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(&config.security)?;

        let ttl = i64::try_from(config.auth.token_ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| anyhow::anyhow!("auth.token_ttl_seconds is too large"))?;
        let tokens = Arc::new(TokenManager::new(&config.auth.jwt_secret, ttl));

        let users = Arc::new(DefaultUserService::new(user_repo.clone(), hasher.clone()));
        let movies = Arc::new(DefaultMovieService::new(movie_repo.clone(), user_repo.clone()));
        let votes = Arc::new(DefaultVoteService::new(
            vote_repo,
            user_repo.clone(),
            movie_repo,
        ));
        let sessions = Arc::new(DefaultSessionService::new(
            user_repo,
            hasher,
            tokens.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            users,
            movies,
            votes,
            sessions,
        })
    }
}
