//! Authentication and session handling.
//!
//! - `password`: `CredentialHasher` port for slow salted password hashing
//! - `token`: `TokenCodec` port for signed, expiring session tokens
//! - `authenticator`: login (credential verification + token issuance)
//! - `guard`: `SessionGuard` turning presented tokens into identities
//! - `users`: provisioning and profile lookups over the credential store

pub mod authenticator;
pub mod guard;
pub mod password;
pub mod token;
pub mod users;
