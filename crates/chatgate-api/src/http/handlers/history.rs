//! Chat history endpoints.
//!
//! Endpoints:
//! - GET    /chat/history - the caller's most recent exchanges
//! - DELETE /chat/history - delete every exchange the caller owns

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use chatgate_types::chat::ChatExchange;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Capped at the configured history limit.
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ChatExchange>,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub message: String,
    pub deleted: u64,
}

/// GET /chat/history - most recent first.
pub async fn get_history(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, AppError> {
    let Query(query) = query?;
    let max = state.config.history_limit;
    let limit = query.limit.map(|l| l.min(max));

    let history = state.chat_service.get_history(&identity, limit).await?;
    Ok(Json(HistoryResponse { history }))
}

/// DELETE /chat/history - idempotent; clearing an empty history succeeds.
pub async fn clear_history(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<ClearHistoryResponse>, AppError> {
    let deleted = state.chat_service.clear_history(&identity).await?;
    Ok(Json(ClearHistoryResponse {
        message: "Chat history cleared".to_string(),
        deleted,
    }))
}
