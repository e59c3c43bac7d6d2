use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single executed trade in a user's ledger.
///
/// Append-only: a transaction is never updated or deleted once committed.
/// The share count is signed: positive means a buy, negative a sell. Current
/// holdings are always derived by summing these signed counts; they are never
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Global monotonic sequence number assigned at commit.
    /// Defines the explicit chronological order of the ledger.
    pub seq: u64,

    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Signed share count: positive = buy, negative = sell
    pub shares: i64,

    /// Execution price at the time of the trade
    pub price: f64,

    /// Commit time
    pub executed_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether this row records a purchase.
    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.shares > 0
    }

    /// Signed cash movement of this trade: negative for buys (cash out),
    /// positive for sells (cash in).
    #[must_use]
    pub fn cash_delta(&self) -> f64 {
        -(self.shares as f64) * self.price
    }
}
