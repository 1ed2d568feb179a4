//! Argon2id password hashing.
//!
//! Implements `CredentialHasher` from `chatgate-core` using the `argon2`
//! crate (RustCrypto ecosystem). Hashes are self-describing PHC strings
//! carrying algorithm, parameters and salt, so stored hashes keep verifying
//! if the default parameters change later.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use chatgate_core::auth::password::CredentialHasher;
use chatgate_types::error::PasswordError;

/// Argon2id implementation of `CredentialHasher`.
///
/// Hashing is CPU-bound and runs on the blocking thread pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

fn verify_blocking(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e.to_string())),
    }
}

impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| PasswordError::Hash(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &password_hash))
            .await
            .map_err(|e| PasswordError::Hash(format!("verification task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("testAI00!").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("testAI00!"));
        assert!(hasher.verify_password("testAI00!", &hash).await.unwrap());
        assert!(!hasher.verify_password("testAI00?", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() {
        let hasher = Argon2PasswordHasher::new();
        let a = hasher.hash_password("pw").await.unwrap();
        let b = hasher.hash_password("pw").await.unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify_password("pw", &a).await.unwrap());
        assert!(hasher.verify_password("pw", &b).await.unwrap());
    }

    #[tokio::test]
    async fn test_garbage_hash_is_invalid() {
        let hasher = Argon2PasswordHasher::new();
        let err = hasher.verify_password("pw", "not-a-phc-string").await.unwrap_err();
        assert!(matches!(err, PasswordError::InvalidHash(_)));
    }
}
