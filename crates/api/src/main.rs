//! # PaperTrade API
//!
//! HTTP entry point for the PaperTrade virtual brokerage.
//!
//! ```bash
//! # Run with defaults (in-memory ledger, no persistence)
//! papertrade-api
//!
//! # Persist the ledger across restarts
//! PAPERTRADE_SNAPSHOT_PASSPHRASE=s3cret papertrade-api --snapshot ledger.ptsn
//!
//! # Bind overrides via flags or environment
//! PAPERTRADE_PORT=9090 papertrade-api
//! ```

mod auth;
mod config;
mod error;
mod handlers;
mod middleware;
mod response;
mod routes;
mod state;

use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use papertrade_core::providers::registry::QuoteProviderRegistry;
use papertrade_core::Brokerage;

use config::ApiConfig;
use state::AppState;

/// PaperTrade virtual brokerage server
#[derive(Parser, Debug)]
#[command(name = "papertrade-api")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind host
    #[arg(long, env = "PAPERTRADE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Bind port
    #[arg(long, env = "PAPERTRADE_PORT", default_value_t = 8080)]
    port: u16,

    /// Path of the encrypted ledger snapshot (omit for a volatile ledger)
    #[arg(long, env = "PAPERTRADE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Passphrase protecting the snapshot
    #[arg(long, env = "PAPERTRADE_SNAPSHOT_PASSPHRASE", default_value = "change-me")]
    snapshot_passphrase: String,

    /// HMAC secret for session tokens
    #[arg(long, env = "PAPERTRADE_JWT_SECRET", default_value = "change-me")]
    jwt_secret: String,

    /// Alpha Vantage API key for the fallback quote provider
    #[arg(long, env = "PAPERTRADE_ALPHAVANTAGE_KEY")]
    alphavantage_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("papertrade_api={default_level},papertrade_core={default_level},tower_http=warn"))),
        )
        .init();

    let config = build_config(&args);

    if let Err(e) = run_server(config).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}

fn build_config(args: &Args) -> ApiConfig {
    let mut api_keys = HashMap::new();
    if let Some(key) = &args.alphavantage_key {
        api_keys.insert("alphavantage".to_string(), key.clone());
    }

    ApiConfig {
        host: args.host.clone(),
        port: args.port,
        jwt_secret: args.jwt_secret.clone(),
        jwt_issuer: "papertrade".to_string(),
        jwt_expiry_hours: 24,
        snapshot_path: args.snapshot.clone(),
        snapshot_passphrase: args.snapshot_passphrase.clone(),
        api_keys,
    }
}

async fn run_server(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let brokerage = open_brokerage(&config)?;
    info!(
        users = brokerage.user_count(),
        "brokerage ready, providers: {:?}",
        brokerage
    );

    let state = Arc::new(AppState::new(brokerage, config.clone()));
    let router = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("PaperTrade API listening on http://{}", config.bind_addr());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Persist the ledger before exiting
    if let Some(path) = &config.snapshot_path {
        if state.brokerage.has_unsaved_changes() {
            state
                .brokerage
                .save_to_file(path, &config.snapshot_passphrase)?;
            info!("Ledger snapshot saved to {}", path.display());
        }
    } else if state.brokerage.has_unsaved_changes() {
        warn!("No snapshot path configured; ledger changes are lost on exit");
    }

    info!("PaperTrade API stopped");
    Ok(())
}

/// Open the brokerage: restore the snapshot when one exists, otherwise start
/// with an empty ledger.
fn open_brokerage(config: &ApiConfig) -> Result<Brokerage, Box<dyn std::error::Error>> {
    let registry = QuoteProviderRegistry::new_with_defaults(&config.api_keys);

    match &config.snapshot_path {
        Some(path) if path.exists() => {
            let brokerage =
                Brokerage::load_from_file(path, &config.snapshot_passphrase, registry)?;
            info!("Restored ledger snapshot from {}", path.display());
            Ok(brokerage)
        }
        Some(path) => {
            info!(
                "No snapshot at {}; starting with an empty ledger",
                path.display()
            );
            Ok(Brokerage::with_registry(registry))
        }
        None => Ok(Brokerage::with_registry(registry)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown handler: {e}");
    } else {
        info!("Shutdown signal received");
    }
}
