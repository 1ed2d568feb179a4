//! Shared domain types for chatgate.
//!
//! This crate contains the core domain types used across the gateway:
//! users and credentials, session tokens, chat messages and exchanges,
//! LLM request/response shapes, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod user;
