//! Shared application state for the API server.

use papertrade_core::Brokerage;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Shared application state, one instance behind an `Arc` for all handlers.
pub struct AppState {
    /// The brokerage core (ledger, accounts, portfolio engine, quotes)
    pub brokerage: Brokerage,
    /// JWT manager for the auth gate
    pub jwt: JwtManager,
    /// Server configuration
    pub config: ApiConfig,
}

impl AppState {
    #[must_use]
    pub fn new(brokerage: Brokerage, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, &config.jwt_issuer, config.jwt_expiry_hours);
        Self {
            brokerage,
            jwt,
            config,
        }
    }
}
