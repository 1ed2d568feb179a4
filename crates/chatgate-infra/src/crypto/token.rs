//! HS256 JWT session tokens.
//!
//! Implements `TokenCodec` from `chatgate-core` with `jsonwebtoken`. Claims are
//! `sub`, `iat` and `exp` (Unix seconds). Expiry is checked here rather than
//! by the library so that a token is rejected exactly when `exp <= now`,
//! with no leeway.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use argon2::password_hash::rand_core::{OsRng, RngCore};

use chatgate_core::auth::token::TokenCodec;
use chatgate_types::error::TokenError;
use chatgate_types::session::TokenClaims;

/// Length in bytes of a generated signing secret.
pub const GENERATED_SECRET_BYTES: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// JWT implementation of `TokenCodec`, keyed by a process-wide secret.
///
/// Does not implement Debug: the keys are derived from the signing secret.
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        }
    }
}

fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => TokenError::Malformed("signature mismatch".to_string()),
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(e.to_string()),
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| convert_jwt_error(&e))?;
        let claims = data.claims;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Malformed("exp out of range".to_string()))?;
        if expires_at <= now {
            return Err(TokenError::Expired);
        }
        let issued_at = DateTime::from_timestamp(claims.iat, 0)
            .ok_or_else(|| TokenError::Malformed("iat out of range".to_string()))?;

        Ok(TokenClaims {
            subject: claims.sub,
            issued_at,
            expires_at,
        })
    }
}

/// Generate a random signing secret, hex encoded.
///
/// Used when no secret is configured; tokens then do not survive a restart.
pub fn generate_signing_secret() -> SecretString {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    SecretString::from(hex)
}
