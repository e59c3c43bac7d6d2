use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::CoreError;
use crate::models::user::User;
use crate::storage::ledger::LedgerStore;

/// Cash balance every new account starts with.
pub const STARTING_CASH: f64 = 10_000.0;

/// Longest accepted username.
const MAX_USERNAME_LEN: usize = 64;

/// Registration and login.
///
/// Passwords are hashed with salted Argon2id and stored as PHC strings; the
/// plaintext never reaches the ledger. Authentication collapses unknown-user
/// and wrong-password into the same `InvalidCredentials` error so the API
/// does not leak which usernames exist.
pub struct AccountService;

impl AccountService {
    pub fn new() -> Self {
        Self
    }

    /// Create a new account with the standard starting balance.
    pub fn register(
        &self,
        ledger: &LedgerStore,
        username: &str,
        password: &str,
    ) -> Result<User, CoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CoreError::ValidationError(
                "Username must not be empty".into(),
            ));
        }
        if username.len() > MAX_USERNAME_LEN {
            return Err(CoreError::ValidationError(format!(
                "Username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        if password.is_empty() {
            return Err(CoreError::ValidationError(
                "Password must not be empty".into(),
            ));
        }

        let hash = hash_password(password)?;
        ledger.create_user(username, hash, STARTING_CASH)
    }

    /// Verify credentials and return the matching user.
    pub fn authenticate(
        &self,
        ledger: &LedgerStore,
        username: &str,
        password: &str,
    ) -> Result<User, CoreError> {
        let user = ledger
            .user_by_name(username.trim())
            .ok_or(CoreError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;
        Ok(user)
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a password with Argon2id and a fresh random salt.
fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CoreError::Encryption(format!("Password hashing failed: {e}")))
}

/// Check a password against a stored PHC hash string.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), CoreError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| CoreError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| CoreError::InvalidCredentials)
}
