//! Business logic and port trait definitions for chatgate.
//!
//! This crate defines the "ports" (repository, password-hashing, token and
//! LLM provider traits) that the infrastructure layer implements, plus the
//! services built on them: the authenticator, the session guard, and the
//! chat orchestrator. It depends only on `chatgate-types` -- never on
//! `chatgate-infra` or any database/IO crate.

pub mod auth;
pub mod chat;
pub mod llm;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
