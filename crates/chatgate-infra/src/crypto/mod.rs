//! Cryptographic operations for chatgate.
//!
//! - `password`: Argon2id password hashing (PHC strings)
//! - `token`: HS256 JWT session tokens and signing-secret generation

pub mod password;
pub mod token;
