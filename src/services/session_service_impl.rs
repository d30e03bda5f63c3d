//! Repository-backed implementation of the `SessionService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{PasswordHasher, TokenManager};
use crate::db::UserRepository;
use crate::domain::{Session, SessionUser};
use crate::services::{ServiceError, SessionService};

pub struct DefaultSessionService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenManager>,
}

impl DefaultSessionService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

#[async_trait]
impl SessionService for DefaultSessionService {
    async fn create(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if !self.hasher.verify(password, &user.password_hash).await? {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.sign(user.id, user.is_admin)?;
        info!(user_id = %user.id, "Session created");

        Ok(Session {
            user: SessionUser::from(&user),
            token,
        })
    }
}
