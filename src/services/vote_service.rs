//! Domain service for votes.
//!
//! One vote per user and movie; only the owner edits, owner or admin removes.

use crate::domain::{ListQuery, NewVote, Paginated, UserId, Vote, VoteId, VoteUpdate};
use crate::services::ServiceError;

#[async_trait::async_trait]
pub trait VoteService: Send + Sync {
    /// # Errors
    ///
    /// [`ServiceError::DuplicateVote`] if the user already rated the movie.
    async fn create(&self, input: NewVote) -> Result<Vote, ServiceError>;

    async fn find_by_id(&self, id: VoteId) -> Result<Vote, ServiceError>;

    async fn get_all(&self, query: &ListQuery) -> Result<Paginated<Vote>, ServiceError>;

    /// Changes the rating. `update.user_id` must be the vote's owner.
    async fn update(&self, id: VoteId, update: VoteUpdate) -> Result<Vote, ServiceError>;

    async fn remove(&self, id: VoteId, actor: UserId, actor_is_admin: bool)
    -> Result<(), ServiceError>;
}
