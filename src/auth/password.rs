//! Argon2id password hashing.
//!
//! Hashing and verification are CPU bound and run on the blocking pool so
//! they never stall the async runtime.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid Argon2 params: {0}")]
    Params(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid password hash format: {0}")]
    Format(String),

    #[error("Password task panicked: {0}")]
    Join(#[from] task::JoinError),
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: &SecurityConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| PasswordError::Params(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Derives a PHC-formatted digest with a fresh random salt.
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon2 = self.argon2();
        let password = password.to_string();

        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| PasswordError::Hash(e.to_string()))
        })
        .await?
    }

    /// Checks a plaintext against a stored digest. The parameters embedded in
    /// the digest win over the configured ones.
    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        let argon2 = self.argon2();
        let password = password.to_string();
        let digest = digest.to_string();

        task::spawn_blocking(move || {
            let parsed =
                PasswordHash::new(&digest).map_err(|e| PasswordError::Format(e.to_string()))?;
            Ok(argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await?
    }
}
