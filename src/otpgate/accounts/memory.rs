use super::{AccountStore, Credentials, InsertOutcome, NewAccount, OtpState, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A stored account, as held by [`MemoryAccountStore`].
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub otp: String,
    pub otp_expiry: DateTime<Utc>,
    pub is_verified: bool,
}

/// Process-local account store. Email and phone uniqueness is checked under the
/// write lock, so concurrent signups cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, AccountRecord>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, email: &str) -> Option<AccountRecord> {
        self.accounts
            .read()
            .await
            .values()
            .find(|record| record.email == email)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Move the OTP expiry of an account, returns false when the email is unknown.
    pub async fn set_otp_expiry(&self, email: &str, otp_expiry: DateTime<Utc>) -> bool {
        let mut accounts = self.accounts.write().await;
        match accounts.values_mut().find(|record| record.email == email) {
            Some(record) => {
                record.otp_expiry = otp_expiry;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert_if_absent(&self, account: &NewAccount) -> Result<InsertOutcome, StoreError> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|record| record.email == account.email || record.phone == account.phone)
        {
            return Ok(InsertOutcome::Conflict);
        }

        let id = Uuid::new_v4();
        accounts.insert(
            id,
            AccountRecord {
                id,
                email: account.email.clone(),
                phone: account.phone.clone(),
                password_hash: account.password_hash.clone(),
                otp: account.otp.clone(),
                otp_expiry: account.otp_expiry,
                is_verified: false,
            },
        );

        Ok(InsertOutcome::Inserted(id))
    }

    async fn otp_state(&self, email: &str) -> Result<Option<OtpState>, StoreError> {
        Ok(self.get(email).await.map(|record| OtpState {
            otp: record.otp,
            otp_expiry: record.otp_expiry,
            is_verified: record.is_verified,
        }))
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write().await;
        match accounts.values_mut().find(|record| record.email == email) {
            Some(record) => {
                record.is_verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn credentials_by_phone(&self, phone: &str) -> Result<Option<Credentials>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|record| record.phone == phone)
            .map(|record| Credentials {
                email: record.email.clone(),
                password_hash: record.password_hash.clone(),
                is_verified: record.is_verified,
            }))
    }

    async fn discard_unverified(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.get(&id).is_some_and(|record| !record.is_verified) {
            accounts.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
