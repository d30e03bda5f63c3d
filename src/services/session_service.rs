//! Domain service for logging in.

use crate::domain::Session;
use crate::services::ServiceError;

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Verifies credentials and issues a signed, time-limited token.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown email and
    /// [`ServiceError::InvalidCredentials`] for a wrong password.
    async fn create(&self, email: &str, password: &str) -> Result<Session, ServiceError>;
}
