use clap::{builder::ValueParser, Arg, Command};
use std::{fmt, str::FromStr};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_ENV: &str = "env";

/// Deployment environment; selects the log format and default level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

impl Environment {
    #[must_use]
    pub const fn default_level(self) -> tracing::Level {
        match self {
            Self::Local | Self::Dev => tracing::Level::DEBUG,
            Self::Prod => tracing::Level::INFO,
        }
    }

    /// Local runs log human readable text, everything else logs JSON.
    #[must_use]
    pub const fn json_logs(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            _ => Err(format!("unknown environment: {s} (expected local, dev or prod)")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Prod => "prod",
        };
        f.write_str(name)
    }
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENV)
                .short('e')
                .long("env")
                .help("Deployment environment: local, dev, prod")
                .default_value("local")
                .env("SSO_ENV")
                .global(true)
                .value_parser(|s: &str| s.parse::<Environment>()),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: per environment)")
                .env("SSO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("local".parse::<Environment>(), Ok(Environment::Local));
        assert_eq!("DEV".parse::<Environment>(), Ok(Environment::Dev));
        assert_eq!("Prod".parse::<Environment>(), Ok(Environment::Prod));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn environment_defaults() {
        assert_eq!(Environment::Local.default_level(), tracing::Level::DEBUG);
        assert_eq!(Environment::Dev.default_level(), tracing::Level::DEBUG);
        assert_eq!(Environment::Prod.default_level(), tracing::Level::INFO);
        assert!(!Environment::Local.json_logs());
        assert!(Environment::Dev.json_logs());
        assert!(Environment::Prod.json_logs());
    }

    #[test]
    fn environment_display_round_trips() {
        for env in [Environment::Local, Environment::Dev, Environment::Prod] {
            assert_eq!(env.to_string().parse::<Environment>(), Ok(env));
        }
    }
}
