use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Trait abstraction for external quote providers.
///
/// Each market-data API (Yahoo Finance, Alpha Vantage) implements this trait.
/// If an API stops working or changes, only that one implementation is
/// replaced; the trading logic is untouched.
///
/// Providers must be treated as slow and unreliable collaborators: a failed
/// lookup surfaces as an error to the caller and must never panic or block
/// forever.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Resolve a ticker symbol to its current price and display name.
    ///
    /// Returns `CoreError::InvalidSymbol` when the provider does not know the
    /// symbol, `CoreError::Api`/`CoreError::Network` on transport trouble.
    async fn lookup(&self, symbol: &str) -> Result<Quote, CoreError>;
}
