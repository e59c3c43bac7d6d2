use async_trait::async_trait;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Yahoo Finance quote provider.
///
/// - **Free**: No API key required.
/// - **No strict rate limits** (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. The latest close is taken as the current price; the display
/// name comes from the symbol search endpoint and degrades to the bare
/// symbol when the search yields nothing usable.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Best-effort display name for a symbol. Name is cosmetic: a search
    /// failure must not fail a lookup whose price already resolved.
    async fn display_name(&self, symbol: &str) -> Option<String> {
        let result = self.connector.search_ticker(symbol).await.ok()?;
        let item = result
            .quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .or_else(|| result.quotes.first())?;

        if !item.long_name.is_empty() {
            Some(item.long_name.clone())
        } else if !item.short_name.is_empty() {
            Some(item.short_name.clone())
        } else {
            None
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn lookup(&self, symbol: &str) -> Result<Quote, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        // An empty candle set means Yahoo does not know the symbol.
        let candle = resp
            .last_quote()
            .map_err(|_| CoreError::InvalidSymbol(symbol.to_uppercase()))?;

        let name = self
            .display_name(symbol)
            .await
            .unwrap_or_else(|| symbol.to_uppercase());

        Ok(Quote::new(symbol, name, candle.close))
    }
}
