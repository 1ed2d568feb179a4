//! TokenCodec trait for signed session tokens.
//!
//! The signing secret belongs to the implementation and is handed to it at
//! construction; nothing here reads the environment.

use chrono::{DateTime, Utc};

use chatgate_types::error::TokenError;
use chatgate_types::session::TokenClaims;

/// Encodes and decodes signed, expiring session tokens.
///
/// Stateless: output depends only on the input and the process-wide secret.
pub trait TokenCodec: Send + Sync {
    /// Produce a signed token for `subject`.
    fn encode(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError>;

    /// Verify and decode a token as of `now`.
    ///
    /// Fails with `Malformed` if the token cannot be parsed or its signature
    /// does not verify, and with `Expired` if `expires_at <= now`.
    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;

    /// Verify and decode a token as of the current time.
    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.decode_at(token, Utc::now())
    }
}
