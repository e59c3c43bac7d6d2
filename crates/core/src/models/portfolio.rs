use serde::{Deserialize, Serialize};

/// Net shares of one symbol, derived from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: i64,
}

/// One valued portfolio line: a holding enriched with a fresh quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    /// Current price per share
    pub price: f64,
    /// shares × price
    pub value: f64,
}

/// A fully valued portfolio: every open position plus cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioView {
    pub positions: Vec<Position>,
    pub cash: f64,
    /// Sum of all position values plus cash
    pub total: f64,
}
