//! Portfolio view, deposits, and transaction history handlers.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use papertrade_core::models::portfolio::PortfolioView;
use papertrade_core::models::transaction::Transaction;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Holdings valued at current quotes, plus cash and grand total.
///
/// GET /api/v1/portfolio
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
) -> ApiResult<ApiResponse<PortfolioView>> {
    let view = state.brokerage.portfolio(user.user_id).await?;
    Ok(ApiResponse::success(view))
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub cash: f64,
}

/// Credit cash to the account. Deposits never appear in the trade history.
///
/// POST /api/v1/deposit
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
    Json(req): Json<DepositRequest>,
) -> ApiResult<ApiResponse<DepositResponse>> {
    let cash = state.brokerage.deposit(user.user_id, req.amount)?;
    info!(user_id = %user.user_id, amount = req.amount, "deposit accepted");
    Ok(ApiResponse::success(DepositResponse { cash }))
}

/// One trade row as shown to the user.
#[derive(Debug, Serialize)]
pub struct TransactionEntry {
    pub symbol: String,
    /// "buy" or "sell"
    pub side: &'static str,
    /// Unsigned share count
    pub shares: i64,
    pub price: f64,
    pub executed_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionEntry {
    fn from(t: Transaction) -> Self {
        Self {
            side: if t.is_buy() { "buy" } else { "sell" },
            shares: t.shares.abs(),
            symbol: t.symbol,
            price: t.price,
            executed_at: t.executed_at,
        }
    }
}

/// Full trade history, chronological.
///
/// GET /api/v1/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Auth(user): Auth,
) -> ApiResult<ApiResponse<Vec<TransactionEntry>>> {
    let history = state
        .brokerage
        .history(user.user_id)?
        .into_iter()
        .map(TransactionEntry::from)
        .collect();
    Ok(ApiResponse::success(history))
}
