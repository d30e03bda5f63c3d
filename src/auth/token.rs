//! HS256 session tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token generation failed: {0}")]
    Encode(String),

    #[error("Token expired")]
    Expired,

    #[error("Token invalid: {0}")]
    Invalid(String),
}

/// Payload carried by every token. The role rides along so that requests
/// never need a second lookup to authorize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenManager {
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn sign(&self, id: UserId, is_admin: bool) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies_with_the_same_secret() {
        let manager = TokenManager::new("secret", Duration::hours(1));
        let id = UserId::new_v4();
        let token = manager.sign(id, true).unwrap();

        let claims = manager.verify(&token).unwrap();
        assert_eq!(claims.id, id);
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenManager::new("secret", Duration::hours(1))
            .sign(UserId::new_v4(), false)
            .unwrap();
        let result = TokenManager::new("other", Duration::hours(1)).verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let manager = TokenManager::new("secret", Duration::seconds(-60));
        let token = manager.sign(UserId::new_v4(), false).unwrap();
        assert!(matches!(manager.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_rejected() {
        let manager = TokenManager::new("secret", Duration::hours(1));
        assert!(manager.verify("not.a.token").is_err());
        assert!(manager.verify("").is_err());
    }
}
