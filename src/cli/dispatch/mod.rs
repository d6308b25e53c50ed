use crate::cli::{
    actions::{server::Args, Action},
    commands::{ARG_APPLY_SCHEMA, ARG_DSN, ARG_PORT, ARG_TOKEN_TTL},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let token_ttl = matches
        .get_one::<u64>(ARG_TOKEN_TTL)
        .copied()
        .context("missing required argument: --token-ttl")?;

    Ok(Action::Server(Args {
        port,
        dsn: SecretString::from(dsn),
        token_ttl: Duration::from_secs(token_ttl),
        apply_schema: matches.get_flag(ARG_APPLY_SCHEMA),
    }))
}
