//! Application error type mapping to HTTP status codes and envelope format.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use chatgate_types::error::{AuthError, ChatError, RepositoryError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Login and token failures.
    Auth(AuthError),
    /// Chat orchestrator failures.
    Chat(ChatError),
    /// Store failures outside the chat path (e.g. user counts).
    Repository(RepositoryError),
    /// Malformed request body or query string.
    Validation(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl AppError {
    /// Status, machine-readable code, and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Incorrect username or password".to_string(),
            ),
            AppError::Auth(AuthError::CredentialsRequired) => (
                StatusCode::FORBIDDEN,
                "CREDENTIALS_REQUIRED",
                "Not authenticated".to_string(),
            ),
            AppError::Auth(AuthError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Could not validate credentials".to_string(),
            ),
            AppError::Auth(AuthError::NotFound) | AppError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "User not found".to_string())
            }
            AppError::Auth(e) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string()),
            AppError::Chat(ChatError::Provider(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROVIDER_ERROR",
                format!("Error from completion provider: {msg}"),
            ),
            AppError::Chat(ChatError::History(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "HISTORY_ERROR", msg.clone())
            }
            AppError::Repository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }

    /// Token failures carry a bearer challenge.
    fn challenges_bearer(&self) -> bool {
        matches!(
            self,
            AppError::Auth(AuthError::InvalidCredentials | AuthError::Unauthorized)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }

        let request_id = uuid::Uuid::now_v7().to_string();
        let body = ApiResponse::error(code, &message, request_id, 0);
        let body = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();

        if self.challenges_bearer() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(err: AppError) -> (StatusCode, &'static str) {
        let (status, code, _) = err.parts();
        (status, code)
    }

    #[test]
    fn test_every_category_is_distinct() {
        assert_eq!(
            status_and_code(AuthError::InvalidCredentials.into()),
            (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
        );
        assert_eq!(
            status_and_code(AuthError::CredentialsRequired.into()),
            (StatusCode::FORBIDDEN, "CREDENTIALS_REQUIRED")
        );
        assert_eq!(
            status_and_code(AuthError::Unauthorized.into()),
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
        );
        assert_eq!(
            status_and_code(AuthError::NotFound.into()),
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        );
        assert_eq!(
            status_and_code(ChatError::Provider("boom".to_string()).into()),
            (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR")
        );
        assert_eq!(
            status_and_code(ChatError::History("locked".to_string()).into()),
            (StatusCode::INTERNAL_SERVER_ERROR, "HISTORY_ERROR")
        );
        assert_eq!(
            status_and_code(AppError::Validation("bad".to_string())),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
        assert_eq!(
            status_and_code(RepositoryError::Connection.into()),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[test]
    fn test_token_failures_challenge_bearer() {
        let response = AppError::from(AuthError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let response = AppError::from(AuthError::CredentialsRequired).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_provider_message_is_prefixed() {
        let (_, _, message) = AppError::from(ChatError::Provider("timeout".to_string())).parts();
        assert_eq!(message, "Error from completion provider: timeout");
    }
}
