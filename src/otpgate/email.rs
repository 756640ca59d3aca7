use anyhow::{Context, Result};
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, info};

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail. Implementations block, callers run them off the async runtime.
pub trait EmailSender: Send + Sync {
    /// # Errors
    /// Returns an error if the message could not be handed to the mail transport.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Used when no SMTP host is configured: the message is only logged.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.body,
            "email send stub"
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from: Option<String>,
}

pub struct SmtpEmailSender {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Build a STARTTLS transport for the configured relay.
    ///
    /// # Errors
    /// Returns an error if the relay or the sender address is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from = config
            .from
            .as_deref()
            .unwrap_or(&config.username)
            .parse::<Mailbox>()
            .context("Invalid SMTP sender address")?;

        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = SmtpTransport::starttls_relay(&config.host)
            .with_context(|| format!("Failed to create SMTP transport for {}", config.host))?
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { mailer, from })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(message
                .to_email
                .parse()
                .context("Invalid recipient address")?)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .context("Failed to build email")
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = self.build_message(message)?;

        self.mailer
            .send(&email)
            .with_context(|| format!("Failed to send email to {}", message.to_email))?;

        debug!(to_email = %message.to_email, "email sent");

        Ok(())
    }
}
