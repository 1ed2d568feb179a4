//! Identity-scoped read endpoints.
//!
//! Endpoints:
//! - GET /dashboard - greeting plus a small usage summary
//! - GET /profile   - the caller's identity record

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use chatgate_types::user::UserProfile;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthenticatedUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub message: String,
    pub dashboard_data: DashboardData,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub total_users: u64,
    pub login_time: DateTime<Utc>,
}

/// GET /dashboard - greet the caller.
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let total_users = state.user_service.count_users().await?;

    Ok(Json(DashboardResponse {
        message: format!("Hello, {identity}!"),
        dashboard_data: DashboardData {
            total_users,
            login_time: Utc::now(),
        },
    }))
}

/// GET /profile - the stored record for the caller.
pub async fn profile(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.user_service.profile(&identity).await?;
    Ok(Json(profile))
}
