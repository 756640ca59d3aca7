//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{
    Action,
    server::{Args, StoreKind},
};
use crate::cli::commands::{ARG_CORS_ORIGIN, ARG_DSN, ARG_PORT, ARG_STORE, smtp};
use anyhow::{Result, anyhow};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let store = match matches.get_one::<String>(ARG_STORE).map(String::as_str) {
        Some("memory") => StoreKind::Memory,
        Some("postgres") | None => StoreKind::Postgres,
        Some(other) => return Err(anyhow!("unsupported store: {other}")),
    };

    let dsn = matches.get_one::<String>(ARG_DSN).cloned();

    if store == StoreKind::Postgres && dsn.is_none() {
        return Err(anyhow!("missing required argument: --{ARG_DSN}"));
    }

    Ok(Action::Server(Args {
        port,
        store,
        dsn,
        smtp: smtp::Options::parse(matches)?,
        cors_origin: matches.get_one::<String>(ARG_CORS_ORIGIN).cloned(),
    }))
}
