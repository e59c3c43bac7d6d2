use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::Holding;
use crate::models::transaction::Transaction;
use crate::models::user::User;

/// One user's row plus their append-only trade ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub user: User,
    /// Committed trades in ascending `seq` order. Never rewritten.
    pub transactions: Vec<Transaction>,
}

/// Serializable snapshot of the whole ledger, used by the snapshot store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: Vec<Account>,
    pub next_seq: u64,
}

/// The ledger store: all user rows and transaction rows, keyed by user id.
///
/// Concurrency model: each account lives behind its own map entry; `update`
/// holds that entry exclusively for the duration of a read-validate-write
/// sequence, so two concurrent operations on the same user serialize and can
/// never both pass validation against the same stale balance. Operations on
/// different users do not contend beyond map sharding.
///
/// Nothing slow may run inside an update scope; in particular, quote lookups
/// happen before the scope is entered.
pub struct LedgerStore {
    accounts: DashMap<Uuid, Account>,
    /// Username uniqueness index: username -> user id
    usernames: DashMap<String, Uuid>,
    /// Global transaction sequence counter
    next_seq: AtomicU64,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            next_seq: AtomicU64::new(1),
        }
    }

    // ── Users ───────────────────────────────────────────────────────

    /// Insert a new user. The username check and the insert are one atomic
    /// step on the uniqueness index, so concurrent registrations of the same
    /// name cannot both succeed.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: String,
        starting_cash: f64,
    ) -> Result<User, CoreError> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateUsername(username.to_string())),
            Entry::Vacant(slot) => {
                let user = User::new(username, password_hash, starting_cash);
                slot.insert(user.id);
                self.accounts.insert(
                    user.id,
                    Account {
                        user: user.clone(),
                        transactions: Vec::new(),
                    },
                );
                Ok(user)
            }
        }
    }

    pub fn user_by_name(&self, username: &str) -> Option<User> {
        let id = *self.usernames.get(username)?;
        self.accounts.get(&id).map(|a| a.user.clone())
    }

    pub fn user_by_id(&self, user_id: Uuid) -> Result<User, CoreError> {
        self.accounts
            .get(&user_id)
            .map(|a| a.user.clone())
            .ok_or(CoreError::UnknownUser(user_id))
    }

    /// Point lookup of a user's cash balance.
    pub fn cash(&self, user_id: Uuid) -> Result<f64, CoreError> {
        self.accounts
            .get(&user_id)
            .map(|a| a.user.cash)
            .ok_or(CoreError::UnknownUser(user_id))
    }

    // ── Aggregation queries ─────────────────────────────────────────

    /// Net shares per symbol for a user, sorted by symbol.
    /// Symbols whose net count reached zero are filtered out.
    pub fn holdings(&self, user_id: Uuid) -> Result<Vec<Holding>, CoreError> {
        let account = self
            .accounts
            .get(&user_id)
            .ok_or(CoreError::UnknownUser(user_id))?;
        Ok(sum_holdings(&account.transactions))
    }

    /// Net shares of a single symbol for a user.
    pub fn shares_held(&self, user_id: Uuid, symbol: &str) -> Result<i64, CoreError> {
        let account = self
            .accounts
            .get(&user_id)
            .ok_or(CoreError::UnknownUser(user_id))?;
        Ok(sum_symbol(&account.transactions, symbol))
    }

    /// Full trade history for a user in ascending `seq` order.
    pub fn transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let account = self
            .accounts
            .get(&user_id)
            .ok_or(CoreError::UnknownUser(user_id))?;
        Ok(account.transactions.clone())
    }

    // ── Atomic update scope ─────────────────────────────────────────

    /// Run a read-validate-write sequence against one user's account as a
    /// single atomic unit.
    ///
    /// The closure sees a staged copy of the account; the copy replaces the
    /// stored account only when the closure returns `Ok`. On `Err` nothing is
    /// applied: no transaction row is written and no balance changes. The
    /// entry lock is held for the whole scope, serializing concurrent updates
    /// for the same user.
    pub fn update<R>(
        &self,
        user_id: Uuid,
        f: impl FnOnce(&mut AccountTxn<'_>) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut entry = self
            .accounts
            .get_mut(&user_id)
            .ok_or(CoreError::UnknownUser(user_id))?;

        let mut staged = entry.clone();
        let mut txn = AccountTxn {
            account: &mut staged,
            next_seq: &self.next_seq,
        };

        let out = f(&mut txn)?;
        *entry = staged;
        Ok(out)
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Materialize the whole ledger for serialization.
    /// Accounts are ordered by username so snapshots are deterministic.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.value().clone()).collect();
        accounts.sort_by(|a, b| a.user.username.cmp(&b.user.username));
        LedgerSnapshot {
            accounts,
            next_seq: self.next_seq.load(Ordering::SeqCst),
        }
    }

    /// Rebuild a store from a snapshot, restoring both indexes.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let store = Self {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            next_seq: AtomicU64::new(snapshot.next_seq.max(1)),
        };
        for account in snapshot.accounts {
            store
                .usernames
                .insert(account.user.username.clone(), account.user.id);
            store.accounts.insert(account.user.id, account);
        }
        store
    }

    pub fn user_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The view a closure gets inside [`LedgerStore::update`].
///
/// `record_trade` appends the transaction row AND applies its cash movement
/// in one call; the two effects cannot be committed separately.
pub struct AccountTxn<'a> {
    account: &'a mut Account,
    next_seq: &'a AtomicU64,
}

impl AccountTxn<'_> {
    pub fn cash(&self) -> f64 {
        self.account.user.cash
    }

    pub fn username(&self) -> &str {
        &self.account.user.username
    }

    /// Net shares of one symbol as of this scope's snapshot.
    pub fn shares_held(&self, symbol: &str) -> i64 {
        sum_symbol(&self.account.transactions, symbol)
    }

    /// Append a trade row and move its cash in one step.
    /// Buys (positive shares) debit cash; sells (negative shares) credit it.
    pub fn record_trade(&mut self, symbol: &str, shares: i64, price: f64) -> Transaction {
        let transaction = Transaction {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            symbol: symbol.to_uppercase(),
            shares,
            price,
            executed_at: Utc::now(),
        };
        self.account.user.cash += transaction.cash_delta();
        self.account.transactions.push(transaction.clone());
        transaction
    }

    /// Credit cash without a ledger row (deposits).
    pub fn credit_cash(&mut self, amount: f64) {
        self.account.user.cash += amount;
    }
}

fn sum_holdings(transactions: &[Transaction]) -> Vec<Holding> {
    let mut totals: std::collections::HashMap<&str, i64> = std::collections::HashMap::new();
    for t in transactions {
        *totals.entry(t.symbol.as_str()).or_insert(0) += t.shares;
    }

    let mut holdings: Vec<Holding> = totals
        .into_iter()
        .filter(|(_, shares)| *shares != 0)
        .map(|(symbol, shares)| Holding {
            symbol: symbol.to_string(),
            shares,
        })
        .collect();
    holdings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    holdings
}

fn sum_symbol(transactions: &[Transaction], symbol: &str) -> i64 {
    let upper = symbol.to_uppercase();
    transactions
        .iter()
        .filter(|t| t.symbol == upper)
        .map(|t| t.shares)
        .sum()
}
