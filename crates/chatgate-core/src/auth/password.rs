//! CredentialHasher trait for password hashing.
//!
//! Defined in chatgate-core so services can hash and verify passwords without
//! coupling to a specific algorithm. The Argon2id adapter lives in
//! chatgate-infra.

use chatgate_types::error::PasswordError;

/// Abstraction over salted, deliberately slow password hashing.
///
/// Implementations must not block the async runtime while hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing encoded string.
    fn hash_password(
        &self,
        password: &str,
    ) -> impl std::future::Future<Output = Result<String, PasswordError>> + Send;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
    /// unusable or hashing itself failed.
    fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, PasswordError>> + Send;
}
