use crate::cli::{
    actions::Action,
    commands::{
        self,
        logging::{Environment, ARG_ENV, ARG_VERBOSITY},
    },
    dispatch, telemetry,
};
use anyhow::Result;
use clap::parser::ValueSource;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> tracing::Level {
    match verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

/// An explicit `-v` or `SSO_LOG_LEVEL` wins over the environment default.
fn resolve_level(matches: &clap::ArgMatches, environment: Environment) -> tracing::Level {
    match matches.value_source(ARG_VERBOSITY) {
        Some(ValueSource::CommandLine | ValueSource::EnvVariable) => get_verbosity_level(
            matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0),
        ),
        _ => environment.default_level(),
    }
}

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let environment = matches
        .get_one::<Environment>(ARG_ENV)
        .copied()
        .unwrap_or(Environment::Local);

    telemetry::init(resolve_level(&matches, environment), environment.json_logs())?;

    tracing::debug!(%environment, "telemetry initialized");

    dispatch::handler(&matches)
}
