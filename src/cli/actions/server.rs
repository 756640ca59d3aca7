use crate::otpgate::{
    self,
    accounts::{MemoryAccountStore, PgAccountStore},
    email::{LogEmailSender, SmtpConfig, SmtpEmailSender},
    handlers::{SharedEmailSender, SharedStore},
};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub store: StoreKind,
    pub dsn: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub cors_origin: Option<String>,
}

/// DSN with the password masked, for logs.
///
/// # Errors
/// Returns an error if the DSN is not a valid URL.
pub fn redact_dsn(dsn: &str) -> Result<String> {
    let mut url = Url::parse(dsn).context("Invalid database connection string")?;

    if url.password().is_some() {
        url.set_password(Some("****"))
            .map_err(|()| anyhow!("Error masking password"))?;
    }

    Ok(url.to_string())
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the mail transport is misconfigured or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store: SharedStore = match args.store {
        StoreKind::Postgres => {
            let dsn = args
                .dsn
                .as_deref()
                .ok_or_else(|| anyhow!("missing required argument: --dsn"))?;

            info!("Connecting to database: {}", redact_dsn(dsn)?);

            let pool = otpgate::connect(dsn).await?;
            Arc::new(PgAccountStore::new(pool))
        }
        StoreKind::Memory => {
            warn!("Using in-memory account store, accounts are lost on restart");
            Arc::new(MemoryAccountStore::new())
        }
    };

    let sender: SharedEmailSender = if let Some(smtp) = &args.smtp {
        info!("Sending OTP mails through {}:{}", smtp.host, smtp.port);
        Arc::new(SmtpEmailSender::new(smtp)?)
    } else {
        warn!("No SMTP host configured, OTP mails are only logged");
        Arc::new(LogEmailSender)
    };

    let cors = otpgate::cors_layer(args.cors_origin.as_deref())?;

    otpgate::new(args.port, otpgate::router(store, sender, cors)).await
}
