use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::{MovieRepository, RepositoryResult, fetch_page, list_select};
use crate::domain::{ListOptions, Movie, MovieId, NewMovie, Page, Vote};
use crate::entities::{movies, votes};

fn column(name: &str) -> Option<movies::Column> {
    match name {
        "id" => Some(movies::Column::Id),
        "director" => Some(movies::Column::Director),
        "name" => Some(movies::Column::Name),
        "genre" => Some(movies::Column::Genre),
        "actors" => Some(movies::Column::Actors),
        "created_at" => Some(movies::Column::CreatedAt),
        "updated_at" => Some(movies::Column::UpdatedAt),
        _ => None,
    }
}

fn into_movie(model: movies::Model, votes: Vec<Vote>) -> Movie {
    Movie {
        id: MovieId::from_uuid(model.id),
        director: model.director,
        name: model.name,
        genre: model.genre,
        actors: model.actors,
        created_at: model.created_at,
        updated_at: model.updated_at,
        votes,
    }
}

pub struct SeaOrmMovieRepository {
    conn: DatabaseConnection,
}

impl SeaOrmMovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Loads the votes of several movies in one query, grouped by movie.
    async fn votes_for(&self, movie_ids: Vec<Uuid>) -> RepositoryResult<HashMap<Uuid, Vec<Vote>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = votes::Entity::find()
            .filter(votes::Column::MovieId.is_in(movie_ids))
            .order_by_asc(votes::Column::CreatedAt)
            .order_by_asc(votes::Column::Id)
            .all(&self.conn)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<Vote>> = HashMap::new();
        for row in rows {
            let movie_id = row.movie_id;
            let vote = Vote::try_from(row)?;
            grouped.entry(movie_id).or_default().push(vote);
        }

        Ok(grouped)
    }
}

#[async_trait]
impl MovieRepository for SeaOrmMovieRepository {
    async fn create(&self, movie: NewMovie) -> RepositoryResult<Movie> {
        let now = Utc::now();
        let model = movies::ActiveModel {
            id: Set(MovieId::new_v4().as_uuid()),
            director: Set(movie.director),
            name: Set(movie.name),
            genre: Set(movie.genre),
            actors: Set(movie.actors),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await?;

        Ok(into_movie(model, Vec::new()))
    }

    async fn find_by_id(&self, id: MovieId) -> RepositoryResult<Option<Movie>> {
        let Some(model) = movies::Entity::find_by_id(id.as_uuid())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut votes = self.votes_for(vec![model.id]).await?;
        let movie_votes = votes.remove(&model.id).unwrap_or_default();

        Ok(Some(into_movie(model, movie_votes)))
    }

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<Movie>> {
        let select = list_select::<movies::Entity, _>(
            Movie::FIELDS,
            column,
            [movies::Column::CreatedAt, movies::Column::Id],
            options,
        );

        let page = fetch_page(&self.conn, select, options).await?;
        let mut votes = self
            .votes_for(page.data.iter().map(|m| m.id).collect())
            .await?;

        Ok(page.map(|model| {
            let movie_votes = votes.remove(&model.id).unwrap_or_default();
            into_movie(model, movie_votes)
        }))
    }

    async fn save(&self, movie: &Movie) -> RepositoryResult<Movie> {
        let model = movies::ActiveModel {
            id: Set(movie.id.as_uuid()),
            director: Set(movie.director.clone()),
            name: Set(movie.name.clone()),
            genre: Set(movie.genre.clone()),
            actors: Set(movie.actors.clone()),
            created_at: Set(movie.created_at),
            updated_at: Set(Utc::now()),
        }
        .update(&self.conn)
        .await?;

        Ok(into_movie(model, movie.votes.clone()))
    }

    async fn remove(&self, id: MovieId) -> RepositoryResult<bool> {
        let result = movies::Entity::delete_by_id(id.as_uuid())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
