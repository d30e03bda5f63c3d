use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::observability::RequestSpan;
use super::{ApiError, AppState};
use crate::domain::UserId;

/// Caller identity taken from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub is_admin: bool,
}

impl AuthUser {
    pub const fn require_admin(self) -> Result<Self, ApiError> {
        if self.is_admin {
            Ok(self)
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    /// Voting is reserved to regular accounts.
    pub const fn require_regular(self) -> Result<Self, ApiError> {
        if self.is_admin {
            Err(ApiError::Unauthorized)
        } else {
            Ok(self)
        }
    }
}

/// Rejects requests without a valid `Authorization: Bearer <token>` header
/// and hands the caller to the handlers as an [`AuthUser`] extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;

    let claims = state.tokens().verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::TokenInvalid
    })?;

    if let Some(RequestSpan(span)) = request.extensions().get::<RequestSpan>() {
        span.record("user_id", tracing::field::display(claims.id));
    }

    request.extensions_mut().insert(AuthUser {
        id: claims.id,
        is_admin: claims.is_admin,
    });

    Ok(next.run(request).await)
}

/// A missing header and a malformed one are reported differently.
fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Err(ApiError::TokenMissing);
    };

    if let Ok(value) = header.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
        && !token.trim().is_empty()
    {
        return Ok(token.trim().to_string());
    }

    Err(ApiError::TokenInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_not_the_same_as_a_bad_one() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            extract_bearer(&headers),
            Err(ApiError::TokenMissing)
        ));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            extract_bearer(&headers),
            Err(ApiError::TokenInvalid)
        ));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def "));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn role_guards() {
        let admin = AuthUser {
            id: UserId::new_v4(),
            is_admin: true,
        };
        let regular = AuthUser {
            is_admin: false,
            ..admin
        };

        assert!(admin.require_admin().is_ok());
        assert!(admin.require_regular().is_err());
        assert!(regular.require_regular().is_ok());
        assert!(regular.require_admin().is_err());
    }
}
