//! Account persistence.
//!
//! Handlers only see the [`AccountStore`] trait. The Postgres store is used in
//! production; the in-memory store backs tests and `--store memory`.

mod memory;
mod postgres;

pub use memory::{AccountRecord, MemoryAccountStore};
pub use postgres::PgAccountStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A pending account as written by signup.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub otp: String,
    pub otp_expiry: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Uuid),
    /// Email or phone already taken.
    Conflict,
}

/// What verification needs to know about an account.
#[derive(Debug, Clone)]
pub struct OtpState {
    pub otp: String,
    pub otp_expiry: DateTime<Utc>,
    pub is_verified: bool,
}

impl OtpState {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.otp_expiry
    }
}

/// What login needs to know about an account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert the account unless its email or phone is already registered.
    async fn insert_if_absent(&self, account: &NewAccount) -> Result<InsertOutcome, StoreError>;

    async fn otp_state(&self, email: &str) -> Result<Option<OtpState>, StoreError>;

    /// Set `is_verified`. Returns false when no account has this email.
    async fn mark_verified(&self, email: &str) -> Result<bool, StoreError>;

    async fn credentials_by_phone(&self, phone: &str) -> Result<Option<Credentials>, StoreError>;

    /// Remove an account only while it is still unverified.
    async fn discard_unverified(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
