//! Route handlers, grouped by resource.

pub mod auth;
pub mod chat;
pub mod history;
pub mod profile;
