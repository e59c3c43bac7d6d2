//! API route definitions.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, health, market, portfolio, trading};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Creates the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/portfolio", get(portfolio::get_portfolio))
        .route("/quote/{symbol}", get(market::get_quote))
        .route("/buy", post(trading::buy))
        .route("/sell", post(trading::sell))
        .route("/deposit", post(portfolio::deposit))
        .route("/history", get(portfolio::get_history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use papertrade_core::providers::registry::QuoteProviderRegistry;
    use papertrade_core::Brokerage;

    #[test]
    fn router_builds_without_panicking() {
        let brokerage = Brokerage::with_registry(QuoteProviderRegistry::new());
        let state = Arc::new(AppState::new(brokerage, ApiConfig::default()));
        let _router = create_router(state);
    }
}
