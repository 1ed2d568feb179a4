//! UserRepository trait definition (the credential store).

use chatgate_types::error::RepositoryError;
use chatgate_types::user::{Credential, UserProfile};

/// Repository trait for user records and their password hashes.
///
/// Implementations live in chatgate-infra (e.g., `SqliteUserRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait UserRepository: Send + Sync {
    /// Look up a credential by exact username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<Credential>, RepositoryError>> + Send;

    /// Insert a new user. Returns `Conflict` if the username is taken.
    fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl std::future::Future<Output = Result<Credential, RepositoryError>> + Send;

    /// List all users, ordered by id.
    fn list_users(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<UserProfile>, RepositoryError>> + Send;

    /// Count all users.
    fn count_users(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
