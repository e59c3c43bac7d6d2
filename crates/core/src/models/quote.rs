use serde::{Deserialize, Serialize};

/// A point-in-time quote for a ticker symbol.
///
/// Ephemeral: fetched from a provider at operation time and never persisted.
/// Trades always execute at a freshly fetched price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, uppercased (e.g., "AAPL")
    pub symbol: String,

    /// Human-readable company name (e.g., "Apple Inc.")
    pub name: String,

    /// Current price in the provider's currency unit
    pub price: f64,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            price,
        }
    }
}
