//! Registration and login handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Must repeat the password exactly
    pub confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session payload returned by both register and login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub cash: f64,
}

/// Create an account and log the new user straight in.
///
/// POST /api/v1/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    if req.password != req.confirmation {
        return Err(ApiError::BadRequest("Passwords do not match".into()));
    }

    let user = state.brokerage.register(&req.username, &req.password)?;
    info!(username = %user.username, "registered new user");

    let token = state.jwt.issue(user.id)?;
    Ok(ApiResponse::success(SessionResponse {
        token,
        user_id: user.id.to_string(),
        username: user.username,
        cash: user.cash,
    }))
}

/// Verify credentials and issue a session token.
///
/// POST /api/v1/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    let user = state.brokerage.login(&req.username, &req.password)?;
    info!(username = %user.username, "user logged in");

    let token = state.jwt.issue(user.id)?;
    Ok(ApiResponse::success(SessionResponse {
        token,
        user_id: user.id.to_string(),
        username: user.username,
        cash: user.cash,
    }))
}
