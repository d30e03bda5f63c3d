use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::types::{ErrorResponse, ValidationErrorResponse};
use crate::services::ServiceError;

#[derive(Debug)]
pub enum ApiError {
    /// Request failed schema validation. Carries every violation found.
    Validation {
        message: String,
        errors: Vec<String>,
    },

    Service(ServiceError),

    TokenMissing,

    TokenInvalid,

    /// Role gate failed in a handler.
    Unauthorized,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { message, .. } => write!(f, "Validation error: {message}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::TokenMissing => write!(f, "Token not provided"),
            Self::TokenInvalid => write!(f, "Token invalid"),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors, message }),
            )
                .into_response(),
            Self::Service(err) => {
                let status = err.status();
                let message = match &err {
                    ServiceError::Database(msg) => {
                        tracing::error!("Database error: {}", msg);
                        "A database error occurred".to_string()
                    }
                    ServiceError::Internal(msg) => {
                        tracing::error!("Internal error: {}", msg);
                        "An internal error occurred".to_string()
                    }
                    other => other.to_string(),
                };
                (status, Json(ErrorResponse::new(message))).into_response()
            }
            Self::TokenMissing | Self::TokenInvalid | Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(self.to_string())),
            )
                .into_response(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl ApiError {
    /// Wraps collected violations. A single violation doubles as the message.
    #[must_use]
    pub fn validation(errors: Vec<String>) -> Self {
        let message = match errors.as_slice() {
            [only] => only.clone(),
            _ => format!("{} errors occurred", errors.len()),
        };
        Self::Validation { message, errors }
    }
}
