use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account holder.
///
/// The username is unique and immutable after registration. Only the salted
/// Argon2id hash of the password is ever stored. The cash balance is mutated
/// exclusively through the ledger's atomic update scope and never goes
/// negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier
    pub id: Uuid,

    /// Login name, unique across the ledger
    pub username: String,

    /// Argon2id PHC hash string of the password
    pub password_hash: String,

    /// Available cash balance
    pub cash: f64,

    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: String, cash: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash,
            cash,
            created_at: Utc::now(),
        }
    }
}
