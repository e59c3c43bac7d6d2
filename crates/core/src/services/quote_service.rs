use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches quotes from external providers with automatic fallback.
///
/// Quotes are always fetched fresh: a trade must execute at the provider's
/// current price, so there is deliberately no cache layer in front of the
/// registry.
///
/// **Note on precision**: prices are `f64`, which has ~15-17 significant
/// decimal digits. Sufficient for valuation display, but repeated arithmetic
/// may accumulate small floating-point errors.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Whether at least one provider is configured.
    pub fn has_provider(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Names of all configured providers, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry
            .providers()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Resolve a symbol to its current quote.
    ///
    /// Tries providers in registration order. If the primary fails (API down,
    /// rate limited, unknown symbol), automatically falls back to the next
    /// provider and returns the last error when all fail. Returned prices are
    /// validated to be finite and positive.
    pub async fn lookup(&self, symbol: &str) -> Result<Quote, CoreError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::InvalidSymbol(String::new()));
        }

        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in providers {
            match provider.lookup(symbol).await {
                Ok(quote) => {
                    if !quote.price.is_finite() || quote.price <= 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {symbol}: {} (must be finite and positive)",
                                quote.price
                            ),
                        });
                        continue;
                    }
                    return Ok(quote);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }
}
