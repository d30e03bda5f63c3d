//! Repository-backed implementation of the `MovieService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::db::{MovieRepository, UserRepository};
use crate::domain::{
    ListQuery, Movie, MovieChanges, MovieId, MovieView, NewMovie, Paginated, UserId,
};
use crate::services::{MovieService, ServiceError, ensure_active};

pub struct DefaultMovieService {
    movies: Arc<dyn MovieRepository>,
    users: Arc<dyn UserRepository>,
}

impl DefaultMovieService {
    #[must_use]
    pub fn new(movies: Arc<dyn MovieRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { movies, users }
    }

    async fn load(&self, id: MovieId) -> Result<Movie, ServiceError> {
        self.movies
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Movie"))
    }
}

#[async_trait]
impl MovieService for DefaultMovieService {
    async fn create(&self, input: NewMovie, actor: UserId) -> Result<MovieView, ServiceError> {
        ensure_active(self.users.as_ref(), actor).await?;

        let movie = self.movies.create(input).await?;
        info!(movie_id = %movie.id, name = %movie.name, "Movie created");
        Ok(movie.into())
    }

    async fn find_by_id(&self, id: MovieId) -> Result<MovieView, ServiceError> {
        self.load(id).await.map(MovieView::from)
    }

    async fn get_all(&self, query: &ListQuery) -> Result<Paginated<MovieView>, ServiceError> {
        let options = query.to_options();
        let page = self.movies.get_all(&options).await?;
        Ok(Paginated::from_page(&options, Movie::FIELDS, page.map(MovieView::from)))
    }

    async fn update(
        &self,
        id: MovieId,
        changes: MovieChanges,
        actor: UserId,
    ) -> Result<MovieView, ServiceError> {
        ensure_active(self.users.as_ref(), actor).await?;

        let current = self.load(id).await?;
        let saved = self.movies.save(&current.apply(&changes)).await?;

        info!(movie_id = %id, "Movie updated");
        Ok(saved.into())
    }

    async fn remove(&self, id: MovieId, actor: UserId) -> Result<(), ServiceError> {
        ensure_active(self.users.as_ref(), actor).await?;

        self.load(id).await?;
        if !self.movies.remove(id).await? {
            return Err(ServiceError::NotFound("Movie"));
        }

        info!(movie_id = %id, "Movie removed");
        Ok(())
    }
}
