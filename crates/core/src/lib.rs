pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use errors::CoreError;
use models::portfolio::{Holding, PortfolioView};
use models::quote::Quote;
use models::transaction::Transaction;
use models::user::User;
use providers::registry::QuoteProviderRegistry;
use services::account_service::AccountService;
use services::portfolio_service::PortfolioService;
use services::quote_service::QuoteService;
use storage::ledger::LedgerStore;
use storage::snapshot::SnapshotStore;

/// Main entry point for the PaperTrade core library.
/// Holds the ledger and all services needed to operate on it.
///
/// Every portfolio operation takes the acting user's id as an explicit
/// argument; there is no ambient identity. All methods take `&self`: the
/// ledger provides per-user atomic update scopes internally, so one
/// `Brokerage` can be shared across concurrent request handlers.
#[must_use]
pub struct Brokerage {
    ledger: LedgerStore,
    accounts: AccountService,
    portfolio: PortfolioService,
    quotes: QuoteService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: AtomicBool,
}

impl std::fmt::Debug for Brokerage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brokerage")
            .field("users", &self.ledger.user_count())
            .field("providers", &self.quotes.provider_names())
            .field("dirty", &self.dirty.load(Ordering::Relaxed))
            .finish()
    }
}

impl Brokerage {
    /// Create an empty brokerage with the default provider registry.
    pub fn new(api_keys: &HashMap<String, String>) -> Self {
        let registry = QuoteProviderRegistry::new_with_defaults(api_keys);
        Self::build(LedgerStore::new(), registry)
    }

    /// Create an empty brokerage with an explicit provider registry
    /// (used by tests to inject mock providers).
    pub fn with_registry(registry: QuoteProviderRegistry) -> Self {
        Self::build(LedgerStore::new(), registry)
    }

    /// Restore a brokerage from encrypted snapshot bytes.
    pub fn load_from_bytes(
        data: &[u8],
        passphrase: &str,
        registry: QuoteProviderRegistry,
    ) -> Result<Self, CoreError> {
        let ledger = SnapshotStore::load_from_bytes(data, passphrase)?;
        Ok(Self::build(ledger, registry))
    }

    /// Serialize the ledger to encrypted snapshot bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&self, passphrase: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = SnapshotStore::save_to_bytes(&self.ledger, passphrase)?;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(bytes)
    }

    /// Restore a brokerage from an encrypted snapshot file.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        passphrase: &str,
        registry: QuoteProviderRegistry,
    ) -> Result<Self, CoreError> {
        let ledger = SnapshotStore::load_from_file(path, passphrase)?;
        Ok(Self::build(ledger, registry))
    }

    /// Save the ledger to an encrypted snapshot file.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_file(&self, path: impl AsRef<Path>, passphrase: &str) -> Result<(), CoreError> {
        SnapshotStore::save_to_file(&self.ledger, path, passphrase)?;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    // ── Accounts ────────────────────────────────────────────────────

    /// Register a new user with the standard starting cash balance.
    pub fn register(&self, username: &str, password: &str) -> Result<User, CoreError> {
        let user = self.accounts.register(&self.ledger, username, password)?;
        self.mark_dirty();
        Ok(user)
    }

    /// Verify credentials and return the matching user.
    pub fn login(&self, username: &str, password: &str) -> Result<User, CoreError> {
        self.accounts.authenticate(&self.ledger, username, password)
    }

    /// Look up a user by id.
    pub fn user(&self, user_id: Uuid) -> Result<User, CoreError> {
        self.ledger.user_by_id(user_id)
    }

    // ── Market data ─────────────────────────────────────────────────

    /// Fetch a standalone quote for a symbol.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.quotes.lookup(symbol).await
    }

    // ── Portfolio operations ────────────────────────────────────────

    /// Net shares per symbol for a user (flat positions hidden).
    pub fn holdings(&self, user_id: Uuid) -> Result<Vec<Holding>, CoreError> {
        self.portfolio.holdings(&self.ledger, user_id)
    }

    /// Holdings valued at current quotes, plus cash and grand total.
    pub async fn portfolio(&self, user_id: Uuid) -> Result<PortfolioView, CoreError> {
        self.portfolio
            .valuate(&self.ledger, &self.quotes, user_id)
            .await
    }

    /// Buy shares at the current quoted price.
    pub async fn buy(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
    ) -> Result<Transaction, CoreError> {
        let receipt = self
            .portfolio
            .buy(&self.ledger, &self.quotes, user_id, symbol, shares)
            .await?;
        self.mark_dirty();
        Ok(receipt)
    }

    /// Sell shares at the current quoted price.
    pub async fn sell(
        &self,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
    ) -> Result<Transaction, CoreError> {
        let receipt = self
            .portfolio
            .sell(&self.ledger, &self.quotes, user_id, symbol, shares)
            .await?;
        self.mark_dirty();
        Ok(receipt)
    }

    /// Credit cash to the account. Returns the new balance.
    pub fn deposit(&self, user_id: Uuid, amount: f64) -> Result<f64, CoreError> {
        let balance = self.portfolio.deposit(&self.ledger, user_id, amount)?;
        self.mark_dirty();
        Ok(balance)
    }

    /// Full trade history, chronological.
    pub fn history(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        self.portfolio.history(&self.ledger, user_id)
    }

    // ── State inspection ────────────────────────────────────────────

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.ledger.user_count()
    }

    /// Returns `true` if the ledger has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: LedgerStore, registry: QuoteProviderRegistry) -> Self {
        Self {
            ledger,
            accounts: AccountService::new(),
            portfolio: PortfolioService::new(),
            quotes: QuoteService::new(registry),
            dirty: AtomicBool::new(false),
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}
