//! User provisioning and profile lookups.
//!
//! Credentials are written by operators (CLI, startup seeding), never by the
//! HTTP surface. Authenticated handlers only read profiles back.

use std::sync::Arc;

use tracing::info;

use chatgate_types::error::{AuthError, PasswordError, RepositoryError};
use chatgate_types::session::Identity;
use chatgate_types::user::{UserProfile, validate_username};

use super::password::CredentialHasher;
use crate::repository::user::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("user '{0}' already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct UserService<U: UserRepository, H: CredentialHasher> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U: UserRepository, H: CredentialHasher> UserService<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }

    /// Create a user, hashing the password before it reaches the store.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserProfile, UserServiceError> {
        validate_username(username).map_err(UserServiceError::InvalidUsername)?;
        if password.is_empty() {
            return Err(UserServiceError::EmptyPassword);
        }

        let password_hash = self.hasher.hash_password(password).await?;
        let credential = self
            .users
            .create_user(username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    UserServiceError::AlreadyExists(username.to_string())
                }
                other => UserServiceError::Repository(other),
            })?;

        info!(username, user_id = credential.id, "user created");
        Ok(credential.profile())
    }

    /// Create the user unless it already exists. Returns `true` if created.
    pub async fn ensure_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, UserServiceError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Ok(false);
        }
        match self.create_user(username, password).await {
            Ok(_) => Ok(true),
            // Lost a race with a concurrent seeder.
            Err(UserServiceError::AlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Profile of an authenticated caller.
    pub async fn profile(&self, identity: &Identity) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_username(identity.username())
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map(|credential| credential.profile())
            .ok_or(AuthError::NotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        self.users.list_users().await
    }

    pub async fn count_users(&self) -> Result<u64, RepositoryError> {
        self.users.count_users().await
    }
}
