//! Errors shared by the rating services.

use axum::http::StatusCode;
use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Carries the entity name, e.g. `User`.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Unauthorized - {0}")]
    Unauthorized(String),

    #[error("Email already registered.")]
    DuplicateEmail,

    #[error("You already rated this movie")]
    DuplicateVote,

    #[error("Password does not match")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    #[must_use]
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail | Self::DuplicateVote | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}
