//! User and credential types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Public identity record returned by profile lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A stored credential: the user record plus its salted password hash.
///
/// Deliberately not `Serialize`, and its `Debug` output redacts the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[redacted]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Maximum username length accepted at provisioning time.
pub const MAX_USERNAME_LEN: usize = 50;

/// Validate a username for provisioning.
///
/// Usernames are non-empty, at most [`MAX_USERNAME_LEN`] characters, and
/// contain no whitespace.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("username must not be empty".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err("username must not contain whitespace".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential {
            id: 1,
            username: "testAI".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_credential_debug_redacts_hash() {
        let debug = format!("{:?}", credential());
        assert!(debug.contains("testAI"));
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn test_profile_drops_hash() {
        let cred = credential();
        let profile = cred.profile();
        assert_eq!(profile.id, 1);
        assert_eq!(profile.username, "testAI");
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("testAI").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LEN + 1)).is_err());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LEN)).is_ok());
    }
}
