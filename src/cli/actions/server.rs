use crate::sso::{self, ServerConfig};
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: SecretString,
    pub token_ttl: Duration,
    pub apply_schema: bool,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            port: args.port,
            dsn: args.dsn,
            token_ttl: args.token_ttl,
            apply_schema: args.apply_schema,
        }
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);
    sso::new(args.into()).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        ("commit", short_commit(crate::GIT_COMMIT_HASH)),
        ("listen", format!("tcp:{}", args.port)),
        ("token_ttl", format!("{}s", args.token_ttl.as_secs())),
        ("apply_schema", args.apply_schema.to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = String::from("Startup configuration:");
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    trimmed.chars().take(7).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit(" abc "), "abc");
        assert_eq!(short_commit("unknown"), "unknown");
    }

    #[test]
    fn args_convert_into_server_config() {
        let config: ServerConfig = Args {
            port: 9090,
            dsn: SecretString::from("postgres://localhost/sso".to_string()),
            token_ttl: Duration::from_secs(60),
            apply_schema: true,
        }
        .into();

        assert_eq!(config.port, 9090);
        assert_eq!(config.dsn.expose_secret(), "postgres://localhost/sso");
        assert_eq!(config.token_ttl, Duration::from_secs(60));
        assert!(config.apply_schema);
    }
}
