use crate::entities::prelude::*;
use crate::entities::votes;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

const USER_MOVIE_INDEX: &str = "idx_votes_user_movie_unique";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Foreign keys to users and movies cascade on delete
        manager
            .create_table(
                schema
                    .create_table_from_entity(Votes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One vote per user and movie
        manager
            .create_index(
                Index::create()
                    .name(USER_MOVIE_INDEX)
                    .table(Votes)
                    .col(votes::Column::UserId)
                    .col(votes::Column::MovieId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_votes_movie_id")
                    .table(Votes)
                    .col(votes::Column::MovieId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Votes).to_owned())
            .await
    }
}
