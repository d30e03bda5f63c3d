use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use super::{RepositoryError, RepositoryResult, VoteRepository, fetch_page, list_select};
use crate::domain::{ListOptions, MovieId, NewVote, Page, Rating, UserId, Vote, VoteId};
use crate::entities::votes;

impl TryFrom<votes::Model> for Vote {
    type Error = RepositoryError;

    fn try_from(model: votes::Model) -> Result<Self, Self::Error> {
        let rating = Rating::new(model.rating).ok_or_else(|| {
            RepositoryError::Database(format!(
                "vote {} has out of range rating {}",
                model.id, model.rating
            ))
        })?;

        Ok(Self {
            id: VoteId::from_uuid(model.id),
            user_id: UserId::from_uuid(model.user_id),
            movie_id: MovieId::from_uuid(model.movie_id),
            rating,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn column(name: &str) -> Option<votes::Column> {
    match name {
        "id" => Some(votes::Column::Id),
        "user_id" => Some(votes::Column::UserId),
        "movie_id" => Some(votes::Column::MovieId),
        "rating" => Some(votes::Column::Rating),
        "created_at" => Some(votes::Column::CreatedAt),
        "updated_at" => Some(votes::Column::UpdatedAt),
        _ => None,
    }
}

pub struct SeaOrmVoteRepository {
    conn: DatabaseConnection,
}

impl SeaOrmVoteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl VoteRepository for SeaOrmVoteRepository {
    async fn create(&self, vote: NewVote) -> RepositoryResult<Vote> {
        let now = Utc::now();
        let model = votes::ActiveModel {
            id: Set(VoteId::new_v4().as_uuid()),
            user_id: Set(vote.user_id.as_uuid()),
            movie_id: Set(vote.movie_id.as_uuid()),
            rating: Set(vote.rating.value()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await?;

        Vote::try_from(model)
    }

    async fn find_by_id(&self, id: VoteId) -> RepositoryResult<Option<Vote>> {
        votes::Entity::find_by_id(id.as_uuid())
            .one(&self.conn)
            .await?
            .map(Vote::try_from)
            .transpose()
    }

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<Vote>> {
        let select = list_select::<votes::Entity, _>(
            Vote::FIELDS,
            column,
            [votes::Column::CreatedAt, votes::Column::Id],
            options,
        );

        let page = fetch_page(&self.conn, select, options).await?;
        let data = page
            .data
            .into_iter()
            .map(Vote::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Page::new(data, page.count))
    }

    async fn save(&self, vote: &Vote) -> RepositoryResult<Vote> {
        let model = votes::ActiveModel {
            id: Set(vote.id.as_uuid()),
            user_id: Set(vote.user_id.as_uuid()),
            movie_id: Set(vote.movie_id.as_uuid()),
            rating: Set(vote.rating.value()),
            created_at: Set(vote.created_at),
            updated_at: Set(Utc::now()),
        }
        .update(&self.conn)
        .await?;

        Vote::try_from(model)
    }

    async fn remove(&self, id: VoteId) -> RepositoryResult<bool> {
        let result = votes::Entity::delete_by_id(id.as_uuid())
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
