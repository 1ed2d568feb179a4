use thiserror::Error;

/// Errors from login and request authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password. The two are never distinguished.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// No credential was presented at all.
    #[error("not authenticated")]
    CredentialsRequired,

    /// A token was presented but is malformed, forged, or expired.
    #[error("invalid token")]
    Unauthorized,

    /// Identity record missing after the token was issued.
    #[error("user not found")]
    NotFound,

    #[error("authentication backend error: {0}")]
    Internal(String),
}

/// Errors from encoding or decoding session tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token expired")]
    Expired,

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Errors from password hashing and verification.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is invalid: {0}")]
    InvalidHash(String),
}

/// Errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The completion provider failed (network, provider-side, or malformed
    /// response).
    #[error("chat provider error: {0}")]
    Provider(String),

    /// Reading or clearing history failed.
    #[error("chat history error: {0}")]
    History(String),
}

/// Errors from repository operations (used by trait definitions in chatgate-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_text_is_generic() {
        let text = AuthError::InvalidCredentials.to_string();
        assert!(text.contains("username or password"));
    }

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::Provider("connection reset".to_string());
        assert_eq!(err.to_string(), "chat provider error: connection reset");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_token_error_display() {
        assert_eq!(TokenError::Expired.to_string(), "token expired");
        assert!(TokenError::Malformed("bad".into()).to_string().contains("bad"));
    }
}
