use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::{RepositoryResult, UserRepository, fetch_page, list_select};
use crate::domain::{ListOptions, NewUserRecord, Page, UserId, UserRecord};
use crate::entities::users;

impl From<users::Model> for UserRecord {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::from_uuid(model.id),
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            is_active: model.is_active,
            is_admin: model.is_admin,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn column(name: &str) -> Option<users::Column> {
    match name {
        "id" => Some(users::Column::Id),
        "name" => Some(users::Column::Name),
        "email" => Some(users::Column::Email),
        "is_active" => Some(users::Column::IsActive),
        "is_admin" => Some(users::Column::IsAdmin),
        "created_at" => Some(users::Column::CreatedAt),
        "updated_at" => Some(users::Column::UpdatedAt),
        _ => None,
    }
}

pub struct SeaOrmUserRepository {
    conn: DatabaseConnection,
}

impl SeaOrmUserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, user: NewUserRecord) -> RepositoryResult<UserRecord> {
        let now = Utc::now();
        let model = users::ActiveModel {
            id: Set(UserId::new_v4().as_uuid()),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            is_active: Set(true),
            is_admin: Set(user.is_admin),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<UserRecord>> {
        let user = users::Entity::find_by_id(id.as_uuid())
            .one(&self.conn)
            .await?;

        Ok(user.map(UserRecord::from))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<UserRecord>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?;

        Ok(user.map(UserRecord::from))
    }

    async fn get_all(&self, options: &ListOptions) -> RepositoryResult<Page<UserRecord>> {
        let select = list_select::<users::Entity, _>(
            UserRecord::FIELDS,
            column,
            [users::Column::CreatedAt, users::Column::Id],
            options,
        );

        Ok(fetch_page(&self.conn, select, options)
            .await?
            .map(UserRecord::from))
    }

    async fn save(&self, user: &UserRecord) -> RepositoryResult<UserRecord> {
        let model = users::ActiveModel {
            id: Set(user.id.as_uuid()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_active: Set(user.is_active),
            is_admin: Set(user.is_admin),
            created_at: Set(user.created_at),
            updated_at: Set(Utc::now()),
        }
        .update(&self.conn)
        .await?;

        Ok(model.into())
    }
}
