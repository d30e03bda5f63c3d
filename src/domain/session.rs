use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;
use super::user::UserRecord;

/// The subset of a user handed back on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&UserRecord> for SessionUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
        }
    }
}

/// Result of a successful login. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Session {
    pub user: SessionUser,
    pub token: String,
}
