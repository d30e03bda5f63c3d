//! Credential primitives: password digests and session tokens.

pub mod password;
pub mod token;

pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenManager};
