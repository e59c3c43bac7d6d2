//! Health check handler.

use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub users: usize,
}

/// GET /api/v1/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResponse<HealthStatus> {
    ApiResponse::success(HealthStatus {
        status: "healthy",
        users: state.brokerage.user_count(),
    })
}
