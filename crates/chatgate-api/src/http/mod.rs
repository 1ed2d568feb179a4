//! HTTP/REST API layer for chatgate.
//!
//! Axum-based REST API with bearer token authentication, an error envelope,
//! SSE chat streaming, and CORS restricted to configured origins.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
