//! Infrastructure layer for chatgate.
//!
//! Contains implementations of the port traits defined in `chatgate-core`:
//! SQLite storage for users and chat history, Argon2id password hashing,
//! HS256 session tokens, and the Azure OpenAI / OpenAI completion provider.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
