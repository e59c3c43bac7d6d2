//! Buy and sell handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub shares: i64,
}

/// Receipt for an executed trade.
#[derive(Debug, Serialize)]
pub struct TradeReceipt {
    pub symbol: String,
    pub side: &'static str,
    pub shares: i64,
    pub price: f64,
    /// Cash balance after the trade
    pub cash: f64,
}

/// Buy shares at the current quoted price.
///
/// POST /api/v1/buy
pub async fn buy(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Json(req): Json<TradeRequest>,
) -> ApiResult<ApiResponse<TradeReceipt>> {
    let receipt = state
        .brokerage
        .buy(user.user_id, &req.symbol, req.shares)
        .await?;
    let cash = state.brokerage.user(user.user_id)?.cash;
    info!(
        user_id = %user.user_id,
        symbol = %receipt.symbol,
        shares = receipt.shares,
        price = receipt.price,
        "buy executed"
    );

    Ok(ApiResponse::success(TradeReceipt {
        symbol: receipt.symbol,
        side: "buy",
        shares: receipt.shares,
        price: receipt.price,
        cash,
    }))
}

/// Sell shares at the current quoted price.
///
/// POST /api/v1/sell
pub async fn sell(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Json(req): Json<TradeRequest>,
) -> ApiResult<ApiResponse<TradeReceipt>> {
    let receipt = state
        .brokerage
        .sell(user.user_id, &req.symbol, req.shares)
        .await?;
    let cash = state.brokerage.user(user.user_id)?.cash;
    info!(
        user_id = %user.user_id,
        symbol = %receipt.symbol,
        shares = receipt.shares,
        price = receipt.price,
        "sell executed"
    );

    Ok(ApiResponse::success(TradeReceipt {
        symbol: receipt.symbol,
        side: "sell",
        shares: receipt.shares.abs(),
        price: receipt.price,
        cash,
    }))
}
