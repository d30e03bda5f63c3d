//! Repository-backed implementation of the `VoteService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{MovieRepository, RepositoryError, UserRepository, VoteRepository};
use crate::domain::{ListQuery, NewVote, Paginated, UserId, Vote, VoteId, VoteUpdate};
use crate::services::{ServiceError, VoteService, ensure_active};

pub struct DefaultVoteService {
    votes: Arc<dyn VoteRepository>,
    users: Arc<dyn UserRepository>,
    movies: Arc<dyn MovieRepository>,
}

impl DefaultVoteService {
    #[must_use]
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        users: Arc<dyn UserRepository>,
        movies: Arc<dyn MovieRepository>,
    ) -> Self {
        Self {
            votes,
            users,
            movies,
        }
    }
}

#[async_trait]
impl VoteService for DefaultVoteService {
    async fn create(&self, input: NewVote) -> Result<Vote, ServiceError> {
        ensure_active(self.users.as_ref(), input.user_id).await?;

        let movie = self
            .movies
            .find_by_id(input.movie_id)
            .await?
            .ok_or(ServiceError::NotFound("Movie"))?;

        if movie.votes.iter().any(|v| v.user_id == input.user_id) {
            warn!(user_id = %input.user_id, movie_id = %input.movie_id, "Duplicate vote rejected");
            return Err(ServiceError::DuplicateVote);
        }

        let vote = self.votes.create(input).await.map_err(|e| match e {
            RepositoryError::UniqueViolation(_) => ServiceError::DuplicateVote,
            other => other.into(),
        })?;

        info!(vote_id = %vote.id, movie_id = %vote.movie_id, rating = vote.rating.value(), "Vote cast");
        Ok(vote)
    }

    async fn find_by_id(&self, id: VoteId) -> Result<Vote, ServiceError> {
        self.votes
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Vote"))
    }

    async fn get_all(&self, query: &ListQuery) -> Result<Paginated<Vote>, ServiceError> {
        let options = query.to_options();
        let page = self.votes.get_all(&options).await?;
        Ok(Paginated::from_page(&options, Vote::FIELDS, page))
    }

    async fn update(&self, id: VoteId, update: VoteUpdate) -> Result<Vote, ServiceError> {
        let current = self.find_by_id(id).await?;
        ensure_active(self.users.as_ref(), current.user_id).await?;

        if current.user_id != update.user_id {
            warn!(vote_id = %id, user_id = %update.user_id, "Vote edit by non-owner rejected");
            return Err(ServiceError::unauthorized("Only owner can edit vote"));
        }

        let saved = self.votes.save(&current.apply(&update)).await?;
        info!(vote_id = %id, rating = saved.rating.value(), "Vote updated");
        Ok(saved)
    }

    async fn remove(
        &self,
        id: VoteId,
        actor: UserId,
        actor_is_admin: bool,
    ) -> Result<(), ServiceError> {
        let vote = self.find_by_id(id).await?;
        ensure_active(self.users.as_ref(), actor).await?;

        if vote.user_id != actor && !actor_is_admin {
            warn!(vote_id = %id, user_id = %actor, "Vote removal by non-owner rejected");
            return Err(ServiceError::unauthorized(
                "Only owner or admins can remove vote",
            ));
        }

        if !self.votes.remove(id).await? {
            return Err(ServiceError::NotFound("Vote"));
        }

        info!(vote_id = %id, "Vote removed");
        Ok(())
    }
}
