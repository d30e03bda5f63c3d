pub mod error;
pub use error::ServiceError;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::UserService;
pub use user_service_impl::DefaultUserService;

pub mod movie_service;
pub mod movie_service_impl;
pub use movie_service::MovieService;
pub use movie_service_impl::DefaultMovieService;

pub mod vote_service;
pub mod vote_service_impl;
pub use vote_service::VoteService;
pub use vote_service_impl::DefaultVoteService;

pub mod session_service;
pub mod session_service_impl;
pub use session_service::SessionService;
pub use session_service_impl::DefaultSessionService;

use crate::db::UserRepository;
use crate::domain::{UserId, UserRecord};

/// Loads the acting account and rejects it when deactivated.
pub(crate) async fn ensure_active(
    users: &dyn UserRepository,
    id: UserId,
) -> Result<UserRecord, ServiceError> {
    let user = users
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("User"))?;

    if !user.is_active {
        tracing::warn!(user_id = %id, "Inactive account attempted a write");
        return Err(ServiceError::unauthorized("This account is inactive"));
    }

    Ok(user)
}
