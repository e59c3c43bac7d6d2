//! Server configuration.

use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for the API server, assembled in `main` from CLI arguments
/// and `PAPERTRADE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Issuer claim stamped into tokens
    pub jwt_issuer: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Path of the encrypted ledger snapshot; `None` disables persistence
    pub snapshot_path: Option<PathBuf>,
    /// Passphrase protecting the snapshot
    pub snapshot_passphrase: String,
    /// Quote provider API keys by provider name (e.g., "alphavantage")
    pub api_keys: HashMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: "change-me".to_string(),
            jwt_issuer: "papertrade".to_string(),
            jwt_expiry_hours: 24,
            snapshot_path: None,
            snapshot_passphrase: "change-me".to_string(),
            api_keys: HashMap::new(),
        }
    }
}

impl ApiConfig {
    /// The socket address string to bind to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
