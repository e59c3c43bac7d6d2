use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::{Holding, PortfolioView, Position};
use crate::models::transaction::Transaction;
use crate::services::quote_service::QuoteService;
use crate::storage::ledger::LedgerStore;

/// The portfolio engine: holdings, valuation, and the buy/sell/deposit
/// operations with their invariants.
///
/// Holdings are always derived by re-aggregating the raw transaction rows;
/// there is no mutable holdings table to fall out of sync. All validation
/// runs inside the ledger's per-user atomic scope, so two concurrent
/// operations on the same account can never both pass against a stale
/// balance. Quote lookups happen before the scope is entered: the ledger is
/// never locked across a network call.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Net shares per symbol for a user. Flat (net-zero) positions are
    /// hidden; the ledger itself keeps every row.
    pub fn holdings(&self, ledger: &LedgerStore, user_id: Uuid) -> Result<Vec<Holding>, CoreError> {
        ledger.holdings(user_id)
    }

    /// Value every open position against a fresh quote and add cash.
    ///
    /// A failed lookup for any held symbol fails the whole valuation; a
    /// portfolio total computed from partial prices would be worse than an
    /// error.
    pub async fn valuate(
        &self,
        ledger: &LedgerStore,
        quotes: &QuoteService,
        user_id: Uuid,
    ) -> Result<PortfolioView, CoreError> {
        let holdings = ledger.holdings(user_id)?;
        let cash = ledger.cash(user_id)?;

        let mut positions = Vec::with_capacity(holdings.len());
        let mut total = cash;
        for holding in holdings {
            let quote = quotes.lookup(&holding.symbol).await?;
            let value = holding.shares as f64 * quote.price;
            total += value;
            positions.push(Position {
                symbol: holding.symbol,
                name: quote.name,
                shares: holding.shares,
                price: quote.price,
                value,
            });
        }

        Ok(PortfolioView {
            positions,
            cash,
            total,
        })
    }

    /// Buy shares at the current quoted price.
    ///
    /// Rejects `InvalidQuantity` for a non-positive count, `InvalidSymbol`
    /// when the symbol does not resolve, and `InsufficientFunds` when the
    /// cost would drive cash negative. On success the transaction row and the
    /// cash debit are committed together.
    pub async fn buy(
        &self,
        ledger: &LedgerStore,
        quotes: &QuoteService,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
    ) -> Result<Transaction, CoreError> {
        ensure_positive_shares(shares)?;
        let quote = quotes.lookup(symbol).await?;

        ledger.update(user_id, |txn| {
            let cost = quote.price * shares as f64;
            let available = txn.cash();
            if available - cost < 0.0 {
                return Err(CoreError::InsufficientFunds {
                    needed: cost,
                    available,
                });
            }
            Ok(txn.record_trade(&quote.symbol, shares, quote.price))
        })
    }

    /// Sell shares at the current quoted price.
    ///
    /// Sells are capped at the currently held count (`InsufficientShares`
    /// otherwise). The resulting-cash check guards against a pathological
    /// negative price slipping past the quote service. On success the
    /// transaction row and the cash credit are committed together.
    pub async fn sell(
        &self,
        ledger: &LedgerStore,
        quotes: &QuoteService,
        user_id: Uuid,
        symbol: &str,
        shares: i64,
    ) -> Result<Transaction, CoreError> {
        ensure_positive_shares(shares)?;
        let quote = quotes.lookup(symbol).await?;

        ledger.update(user_id, |txn| {
            let held = txn.shares_held(&quote.symbol);
            if held < shares {
                return Err(CoreError::InsufficientShares {
                    symbol: quote.symbol.clone(),
                    requested: shares,
                    held,
                });
            }

            let proceeds = quote.price * shares as f64;
            if txn.cash() + proceeds < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Sell of {shares} {} at {} would make the cash balance negative",
                    quote.symbol, quote.price
                )));
            }
            Ok(txn.record_trade(&quote.symbol, -shares, quote.price))
        })
    }

    /// Credit cash to the account. Deposits write no transaction row; the
    /// ledger records trades only.
    pub fn deposit(
        &self,
        ledger: &LedgerStore,
        user_id: Uuid,
        amount: f64,
    ) -> Result<f64, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidQuantity(format!(
                "Deposit amount must be a positive number, got {amount}"
            )));
        }

        ledger.update(user_id, |txn| {
            txn.credit_cash(amount);
            Ok(txn.cash())
        })
    }

    /// Full trade history, chronological (ascending sequence number).
    pub fn history(
        &self,
        ledger: &LedgerStore,
        user_id: Uuid,
    ) -> Result<Vec<Transaction>, CoreError> {
        ledger.transactions(user_id)
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_positive_shares(shares: i64) -> Result<(), CoreError> {
    if shares <= 0 {
        return Err(CoreError::InvalidQuantity(format!(
            "Share count must be a positive whole number, got {shares}"
        )));
    }
    Ok(())
}
