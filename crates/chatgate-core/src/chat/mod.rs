//! Chat orchestration.
//!
//! - `prompt`: system prompt resolution and provider request assembly
//! - `service`: `ChatService` (buffered and streaming completions, history)
//! - `stream`: `ChatStream` and the per-call state tracker

pub mod prompt;
pub mod service;
pub mod stream;
