//! Repository-backed implementation of the `UserService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::PasswordHasher;
use crate::db::{RepositoryError, UserRepository};
use crate::domain::{
    ListQuery, NewUser, NewUserRecord, Paginated, User, UserChanges, UserId, UserRecord,
};
use crate::services::{ServiceError, UserService, ensure_active};

pub struct DefaultUserService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl DefaultUserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    async fn ensure_email_available(&self, email: &str) -> Result<(), ServiceError> {
        if self.users.find_by_email(email).await?.is_some() {
            warn!(email, "Email already registered");
            return Err(ServiceError::DuplicateEmail);
        }
        Ok(())
    }
}

fn duplicate_email(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::UniqueViolation(_) => ServiceError::DuplicateEmail,
        other => other.into(),
    }
}

#[async_trait]
impl UserService for DefaultUserService {
    async fn create(&self, input: NewUser) -> Result<User, ServiceError> {
        self.ensure_email_available(&input.email).await?;

        let password_hash = self.hasher.hash(&input.password).await?;
        let record = self
            .users
            .create(NewUserRecord {
                name: input.name,
                email: input.email,
                password_hash,
                is_admin: input.is_admin,
            })
            .await
            .map_err(duplicate_email)?;

        info!(user_id = %record.id, is_admin = record.is_admin, "User registered");
        Ok(record.into())
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, ServiceError> {
        self.find_record_by_id(id).await.map(User::from)
    }

    async fn find_record_by_id(&self, id: UserId) -> Result<UserRecord, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.find_record_by_email(email).await.map(User::from)
    }

    async fn find_record_by_email(&self, email: &str) -> Result<UserRecord, ServiceError> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    async fn get_all(&self, query: &ListQuery) -> Result<Paginated<User>, ServiceError> {
        let options = query.to_options();
        let page = self.users.get_all(&options).await?;
        Ok(Paginated::from_page(&options, UserRecord::FIELDS, page.map(User::from)))
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, ServiceError> {
        let current = ensure_active(self.users.as_ref(), id).await?;

        if let Some(email) = &changes.email
            && *email != current.email
        {
            self.ensure_email_available(email).await?;
        }

        let password_hash = match &changes.password {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };

        let saved = self
            .users
            .save(&current.apply(&changes, password_hash))
            .await
            .map_err(duplicate_email)?;

        info!(user_id = %saved.id, "User profile updated");
        Ok(saved.into())
    }

    async fn activate(&self, id: UserId) -> Result<User, ServiceError> {
        let current = self.find_record_by_id(id).await?;
        let saved = self.users.save(&current.with_active(true)).await?;

        info!(user_id = %id, "User activated");
        Ok(saved.into())
    }

    async fn inactivate(&self, id: UserId) -> Result<(), ServiceError> {
        let current = self.find_record_by_id(id).await?;
        self.users.save(&current.with_active(false)).await?;

        info!(user_id = %id, "User inactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Fixture;

    #[tokio::test]
    async fn registration_returns_public_projection() {
        let fx = Fixture::new();
        let user = fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();

        assert!(user.is_active);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());

        let record = fx.users.find_record_by_id(user.id).await.unwrap();
        assert!(!record.is_admin);
        assert_ne!(record.password_hash, "secret123");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let fx = Fixture::new();
        fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();

        let err = fx.users.create(Fixture::new_user("a@x.io")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let fx = Fixture::new();
        fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();

        assert!(fx.users.find_by_email("a@x.io").await.is_ok());
        let err = fx.users.find_by_email("A@X.IO").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("User")));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let fx = Fixture::new();
        let err = fx.users.find_by_id(UserId::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn update_changes_fields_and_password() {
        let fx = Fixture::new();
        let user = fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();
        let before = fx.users.find_record_by_id(user.id).await.unwrap();

        let updated = fx
            .users
            .update(
                user.id,
                UserChanges {
                    name: Some("Renamed".into()),
                    password: Some("another1".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "a@x.io");

        let after = fx.users.find_record_by_id(user.id).await.unwrap();
        assert_ne!(after.password_hash, before.password_hash);
        assert!(fx.hasher.verify("another1", &after.password_hash).await.unwrap());
    }

    #[tokio::test]
    async fn update_to_taken_email_fails() {
        let fx = Fixture::new();
        fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();
        let b = fx.users.create(Fixture::new_user("b@x.io")).await.unwrap();

        let err = fx
            .users
            .update(
                b.id,
                UserChanges {
                    email: Some("a@x.io".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail));

        // Keeping one's own address is not a conflict
        fx.users
            .update(
                b.id,
                UserChanges {
                    email: Some("b@x.io".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn inactive_account_cannot_update_until_activated() {
        let fx = Fixture::new();
        let user = fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();
        fx.users.inactivate(user.id).await.unwrap();

        let changes = UserChanges {
            name: Some("Nope".into()),
            ..UserChanges::default()
        };
        let err = fx.users.update(user.id, changes.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized - This account is inactive");

        let activated = fx.users.activate(user.id).await.unwrap();
        assert!(activated.is_active);
        assert_eq!(fx.users.update(user.id, changes).await.unwrap().name, "Nope");
    }

    #[tokio::test]
    async fn listing_respects_forced_role_filter() {
        let fx = Fixture::new();
        fx.users.create(Fixture::new_user("a@x.io")).await.unwrap();
        fx.users
            .create(NewUser {
                is_admin: true,
                ..Fixture::new_user("admin@x.io")
            })
            .await
            .unwrap();

        let regular = fx
            .users
            .get_all(&ListQuery::from_params([("is_admin", "true")]).with("is_admin", "false"))
            .await
            .unwrap();
        assert_eq!(regular.count, 1);
        assert_eq!(regular.data[0].email, "a@x.io");
        assert_eq!(regular.current_page, 1);
        assert_eq!(regular.total_pages, 1);
        assert_eq!(
            regular.filters.get("is_admin"),
            Some(&serde_json::Value::Bool(false))
        );

        let admins = fx
            .users
            .get_all(&ListQuery::new().with("is_admin", "true"))
            .await
            .unwrap();
        assert_eq!(admins.count, 1);
        assert_eq!(admins.data[0].email, "admin@x.io");
    }
}
