//! Domain service for the movie catalogue.
//!
//! Every read attaches the derived `votes_average`; it is never stored.

use crate::domain::{ListQuery, MovieChanges, MovieId, MovieView, NewMovie, Paginated, UserId};
use crate::services::ServiceError;

#[async_trait::async_trait]
pub trait MovieService: Send + Sync {
    /// Creates a movie on behalf of an active account.
    async fn create(&self, input: NewMovie, actor: UserId) -> Result<MovieView, ServiceError>;

    async fn find_by_id(&self, id: MovieId) -> Result<MovieView, ServiceError>;

    async fn get_all(&self, query: &ListQuery) -> Result<Paginated<MovieView>, ServiceError>;

    async fn update(
        &self,
        id: MovieId,
        changes: MovieChanges,
        actor: UserId,
    ) -> Result<MovieView, ServiceError>;

    /// Removes the movie together with its votes.
    async fn remove(&self, id: MovieId, actor: UserId) -> Result<(), ServiceError>;
}
