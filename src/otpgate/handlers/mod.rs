pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod verify_otp;
pub use self::verify_otp::verify_otp;

pub mod login;
pub use self::login::login;

// common types and functions for the handlers
use crate::otpgate::{accounts::AccountStore, email::EmailSender};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub type SharedStore = Arc<dyn AccountStore>;
pub type SharedEmailSender = Arc<dyn EmailSender>;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub fn valid_phone(phone: &str) -> bool {
    // optional leading +, then up to 15 digits (E.164 length)
    Regex::new(r"^\+?[0-9]{1,15}$").is_ok_and(|re| re.is_match(phone))
}

/// Run CPU-bound or blocking work (hashing, SMTP) on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("blocking task panicked or was cancelled")?
}
