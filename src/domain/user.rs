use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;
use super::pagination::{FieldSpec, FilterKind};

/// Public projection of an account. Never carries credentials or the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full stored account, including the hidden fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FilterKind::Id),
        FieldSpec::new("name", FilterKind::Text),
        FieldSpec::new("email", FilterKind::Text),
        FieldSpec::new("is_active", FilterKind::Flag),
        FieldSpec::new("is_admin", FilterKind::Flag),
        FieldSpec::new("created_at", FilterKind::Date),
        FieldSpec::new("updated_at", FilterKind::Date),
    ];

    /// Overlays profile changes. The password is replaced only by an already
    /// derived hash.
    #[must_use]
    pub fn apply(&self, changes: &UserChanges, password_hash: Option<String>) -> Self {
        let mut next = self.clone();
        if let Some(name) = &changes.name {
            next.name.clone_from(name);
        }
        if let Some(email) = &changes.email {
            next.email.clone_from(email);
        }
        if let Some(hash) = password_hash {
            next.password_hash = hash;
        }
        next
    }

    #[must_use]
    pub fn with_active(&self, is_active: bool) -> Self {
        Self {
            is_active,
            ..self.clone()
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Registration input. `is_admin` is only ever set by the caller that
/// creates administrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// What the repository persists for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
