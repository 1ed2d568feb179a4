//! Envelope format for API error responses.
//!
//! Failures are wrapped in a consistent envelope:
//! ```json
//! {
//!   "data": null,
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 0 },
//!   "errors": [{ "code": "UNAUTHORIZED", "message": "invalid token" }]
//! }
//! ```
//! Successful responses are plain JSON bodies.

use serde::Serialize;

/// Envelope wrapping an error (or, in principle, data).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub meta: ApiMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,
}

/// Metadata included in every envelope.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier for tracing.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
    pub response_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    pub message: String,
}

impl ApiResponse<()> {
    /// Create an error envelope (no data).
    pub fn error(code: &str, message: &str, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data: None,
            meta: ApiMeta {
                request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms,
            },
            errors: vec![ApiErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            }],
        }
    }
}
