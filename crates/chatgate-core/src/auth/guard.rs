//! SessionGuard -- precondition check for every protected operation.
//!
//! Validates a presented bearer token and yields the caller's identity.
//! Stateless: validity depends only on signature and expiry.

use std::sync::Arc;

use tracing::debug;

use chatgate_types::error::{AuthError, TokenError};
use chatgate_types::session::Identity;

use super::token::TokenCodec;

pub struct SessionGuard<T: TokenCodec> {
    codec: Arc<T>,
}

impl<T: TokenCodec> SessionGuard<T> {
    pub fn new(codec: Arc<T>) -> Self {
        Self { codec }
    }

    /// Validate a raw token string and return the identity it names.
    ///
    /// Malformed, forged, expired, or subject-less tokens all collapse into
    /// `AuthError::Unauthorized`.
    pub fn authorize(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.decode(token).map_err(|e| {
            match &e {
                TokenError::Expired => debug!("rejecting expired token"),
                other => debug!(error = %other, "rejecting invalid token"),
            }
            AuthError::Unauthorized
        })?;

        if claims.subject.is_empty() {
            debug!("rejecting token without subject");
            return Err(AuthError::Unauthorized);
        }

        Ok(Identity::new(claims.subject))
    }

    /// Like [`authorize`](Self::authorize), but distinguishes "no credential
    /// presented" (`CredentialsRequired`) from a bad one.
    pub fn require(&self, presented: Option<&str>) -> Result<Identity, AuthError> {
        match presented {
            Some(token) => self.authorize(token),
            None => Err(AuthError::CredentialsRequired),
        }
    }
}
