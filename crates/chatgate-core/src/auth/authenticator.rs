//! Login: verify a username/password pair and issue a session token.

use std::sync::Arc;

use chrono::{Duration, SubsecRound, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use chatgate_types::error::{AuthError, PasswordError};
use chatgate_types::session::SessionToken;

use super::password::CredentialHasher;
use super::token::TokenCodec;
use crate::repository::user::UserRepository;

/// Password verified against on the unknown-user path.
const DECOY_PASSWORD: &str = "chatgate-decoy-password";

/// Verifies credentials against the credential store and mints tokens.
///
/// Unknown usernames and wrong passwords produce the same
/// `AuthError::InvalidCredentials`, so callers cannot enumerate accounts.
/// An unknown username still pays for one password verification, against a
/// decoy hash computed on first use.
pub struct Authenticator<U: UserRepository, H: CredentialHasher, T: TokenCodec> {
    users: Arc<U>,
    hasher: Arc<H>,
    codec: Arc<T>,
    session_ttl: Duration,
    decoy_hash: OnceCell<String>,
}

impl<U: UserRepository, H: CredentialHasher, T: TokenCodec> Authenticator<U, H, T> {
    pub fn new(users: Arc<U>, hasher: Arc<H>, codec: Arc<T>, session_ttl: Duration) -> Self {
        Self {
            users,
            hasher,
            codec,
            session_ttl,
            decoy_hash: OnceCell::new(),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Authenticate `username`/`password` and issue a bearer token whose
    /// expiry is exactly `session_ttl` after its issue time.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError> {
        let credential = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let Some(credential) = credential else {
            self.verify_decoy(password).await;
            warn!(username, "login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let verified = match self
            .hasher
            .verify_password(password, &credential.password_hash)
            .await
        {
            Ok(verified) => verified,
            Err(PasswordError::InvalidHash(reason)) => {
                warn!(username, %reason, "login rejected: stored hash unusable");
                false
            }
            Err(e) => return Err(AuthError::Internal(e.to_string())),
        };

        if !verified {
            warn!(username, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        // Whole seconds, so the encoded claims keep `exp - iat == ttl`.
        let issued_at = Utc::now().trunc_subsecs(0);
        let expires_at = issued_at + self.session_ttl;
        let access_token = self
            .codec
            .encode(&credential.username, issued_at, expires_at)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(username = %credential.username, %expires_at, "session issued");
        debug!(ttl_secs = self.session_ttl.num_seconds(), "token ttl");

        Ok(SessionToken::bearer(access_token, expires_at))
    }

    /// Spend the same hashing work as a real mismatch. The outcome is ignored.
    async fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash_password(DECOY_PASSWORD))
            .await;
        match decoy {
            Ok(hash) => {
                let _ = self.hasher.verify_password(password, hash).await;
            }
            Err(e) => debug!(error = %e, "decoy hash unavailable"),
        }
    }
}
