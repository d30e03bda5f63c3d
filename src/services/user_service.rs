//! Domain service for user accounts.
//!
//! Registration, lookup, listing, profile updates and activation. Email
//! uniqueness and the active-account rule are enforced here.

use crate::domain::{ListQuery, NewUser, Paginated, User, UserChanges, UserId, UserRecord};
use crate::services::ServiceError;

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers an account and returns its public projection.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::DuplicateEmail`] if the email is taken.
    async fn create(&self, input: NewUser) -> Result<User, ServiceError>;

    async fn find_by_id(&self, id: UserId) -> Result<User, ServiceError>;

    /// Like [`UserService::find_by_id`] but with the hidden fields.
    async fn find_record_by_id(&self, id: UserId) -> Result<UserRecord, ServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<User, ServiceError>;

    async fn find_record_by_email(&self, email: &str) -> Result<UserRecord, ServiceError>;

    /// Lists accounts. Callers force the `is_admin` filter.
    async fn get_all(&self, query: &ListQuery) -> Result<Paginated<User>, ServiceError>;

    /// Applies a partial profile update.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unauthorized`] for inactive accounts and
    /// [`ServiceError::DuplicateEmail`] when moving to a taken address.
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, ServiceError>;

    async fn activate(&self, id: UserId) -> Result<User, ServiceError>;

    async fn inactivate(&self, id: UserId) -> Result<(), ServiceError>;
}
