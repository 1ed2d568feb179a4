//! Repository trait definitions (ports).
//!
//! Implementations live in chatgate-infra (SQLite). Both stores are shared
//! across concurrent requests; callers rely only on single-statement
//! atomicity.

pub mod history;
pub mod user;
