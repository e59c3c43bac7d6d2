//! Standalone quote lookup handler.

use axum::extract::{Path, State};
use std::sync::Arc;

use papertrade_core::models::quote::Quote;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Look up the current quote for a symbol.
///
/// GET /api/v1/quote/{symbol}
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Auth(_user): Auth,
    Path(symbol): Path<String>,
) -> ApiResult<ApiResponse<Quote>> {
    let quote = state.brokerage.quote(&symbol).await?;
    Ok(ApiResponse::success(quote))
}
