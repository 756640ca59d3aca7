use crate::otpgate::email::SmtpConfig;
use anyhow::{Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_SMTP_USERNAME: &str = "smtp-username";
pub const ARG_SMTP_PASSWORD: &str = "smtp-password";
pub const ARG_SMTP_FROM: &str = "smtp-from";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP relay host, OTP mails are only logged when unset")
                .env("OTPGATE_SMTP_HOST"),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP relay port (STARTTLS)")
                .env("OTPGATE_SMTP_PORT")
                .default_value("587")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SMTP_USERNAME)
                .long(ARG_SMTP_USERNAME)
                .help("SMTP username")
                .env("OTPGATE_SMTP_USERNAME"),
        )
        .arg(
            Arg::new(ARG_SMTP_PASSWORD)
                .long(ARG_SMTP_PASSWORD)
                .help("SMTP password")
                .env("OTPGATE_SMTP_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SMTP_FROM)
                .long(ARG_SMTP_FROM)
                .help("Sender address, defaults to the SMTP username")
                .env("OTPGATE_SMTP_FROM"),
        )
}

pub struct Options;

impl Options {
    /// SMTP settings, `None` when no relay host is configured.
    ///
    /// # Errors
    /// Returns an error if a host is set without username or password.
    pub fn parse(matches: &ArgMatches) -> Result<Option<SmtpConfig>> {
        let Some(host) = matches.get_one::<String>(ARG_SMTP_HOST).cloned() else {
            return Ok(None);
        };

        let username = matches
            .get_one::<String>(ARG_SMTP_USERNAME)
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_SMTP_USERNAME}"))?;

        let password = matches
            .get_one::<String>(ARG_SMTP_PASSWORD)
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_SMTP_PASSWORD}"))?;

        Ok(Some(SmtpConfig {
            host,
            port: matches.get_one::<u16>(ARG_SMTP_PORT).copied().unwrap_or(587),
            username,
            password: SecretString::from(password),
            from: matches.get_one::<String>(ARG_SMTP_FROM).cloned(),
        }))
    }
}
