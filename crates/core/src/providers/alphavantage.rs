use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::quote::Quote;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage quote provider.
///
/// - **Free tier**: 25 requests/day (across ALL endpoints).
/// - **Requires**: API key (configured as "alphavantage").
/// - **Coverage**: 100k+ global equity symbols.
///
/// Registered as a fallback behind Yahoo Finance. A lookup costs two
/// requests: GLOBAL_QUOTE for the price and SYMBOL_SEARCH for the display
/// name. Prices come back in the stock's native currency (typically USD).
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
}

#[derive(Deserialize)]
struct SymbolSearchResponse {
    #[serde(rename = "bestMatches")]
    best_matches: Option<Vec<SymbolMatch>>,
}

#[derive(Deserialize)]
struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    symbol: Option<String>,
    #[serde(rename = "2. name")]
    name: Option<String>,
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "Alpha Vantage"
    }

    async fn lookup(&self, symbol: &str) -> Result<Quote, CoreError> {
        let upper = symbol.to_uppercase();

        let resp: GlobalQuoteResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", upper.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Alpha Vantage".into(),
                message: format!("Failed to parse quote for {upper}: {e}"),
            })?;

        // An empty "Global Quote" object is how the API spells "no such symbol".
        let price_str = resp
            .global_quote
            .and_then(|q| q.price)
            .ok_or_else(|| CoreError::InvalidSymbol(upper.clone()))?;

        let price: f64 = price_str.parse().map_err(|e| CoreError::Api {
            provider: "Alpha Vantage".into(),
            message: format!("Invalid price format for {upper}: {e}"),
        })?;

        let name = self
            .search_name(&upper)
            .await
            .unwrap_or_else(|| upper.clone());

        Ok(Quote::new(upper, name, price))
    }
}

impl AlphaVantageProvider {
    /// Best-effort company name from SYMBOL_SEARCH. Cosmetic only.
    async fn search_name(&self, symbol: &str) -> Option<String> {
        let resp: SymbolSearchResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "SYMBOL_SEARCH"),
                ("keywords", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .ok()?
            .json()
            .await
            .ok()?;

        resp.best_matches?
            .into_iter()
            .find(|m| {
                m.symbol
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
            })
            .and_then(|m| m.name)
    }
}
