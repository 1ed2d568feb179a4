//! Login handler.
//!
//! POST /login - exchange username and password for a bearer token.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use chatgate_types::session::SessionToken;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for login. Not `Debug`: it carries the plaintext password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /login - verify credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionToken>, AppError> {
    let Json(body) = payload?;
    let token = state
        .authenticator
        .authenticate(&body.username, &body.password)
        .await?;
    Ok(Json(token))
}
