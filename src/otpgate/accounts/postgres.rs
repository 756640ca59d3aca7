use super::{AccountStore, Credentials, InsertOutcome, NewAccount, OtpState, StoreError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{Instrument, info_span};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_if_absent(&self, account: &NewAccount) -> Result<InsertOutcome, StoreError> {
        // No conflict target: both the email and the phone constraint apply.
        let query = r"
            INSERT INTO accounts (email, phone, password_hash, otp, otp_expiry, is_verified)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            ON CONFLICT DO NOTHING
            RETURNING id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&account.email)
            .bind(&account.phone)
            .bind(&account.password_hash)
            .bind(&account.otp)
            .bind(account.otp_expiry)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(Some(row)) => Ok(InsertOutcome::Inserted(row.try_get("id")?)),
            Ok(None) => Ok(InsertOutcome::Conflict),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn otp_state(&self, email: &str) -> Result<Option<OtpState>, StoreError> {
        let query = "SELECT otp, otp_expiry, is_verified FROM accounts WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| -> Result<OtpState, StoreError> {
            Ok(OtpState {
                otp: row.try_get("otp")?,
                otp_expiry: row.try_get("otp_expiry")?,
                is_verified: row.try_get("is_verified")?,
            })
        })
        .transpose()
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, StoreError> {
        let query = "UPDATE accounts SET is_verified = TRUE WHERE email = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(email)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn credentials_by_phone(&self, phone: &str) -> Result<Option<Credentials>, StoreError> {
        let query = "SELECT email, password_hash, is_verified FROM accounts WHERE phone = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| -> Result<Credentials, StoreError> {
            Ok(Credentials {
                email: row.try_get("email")?,
                password_hash: row.try_get("password_hash")?,
                is_verified: row.try_get("is_verified")?,
            })
        })
        .transpose()
    }

    async fn discard_unverified(&self, id: Uuid) -> Result<bool, StoreError> {
        let query = "DELETE FROM accounts WHERE id = $1 AND is_verified = FALSE";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
