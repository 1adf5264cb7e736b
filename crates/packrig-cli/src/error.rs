//! Errors surfaced by the `packrig` binary.

use miette::Report;
use packrig_config::ConfigError;
use packrig_producers::ProducerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to produce configuration: {0}")]
    Producer(#[from] ProducerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Render a CLI error with a hint where one helps.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::TargetNotFound(name)) => miette::miette!(
            help = "run `packrig targets` to list the configured targets",
            "target '{}' is not registered",
            name
        ),
        CliError::Config(err @ ConfigError::OverrideLoad { .. })
        | CliError::Producer(ProducerError::Config(err @ ConfigError::OverrideLoad { .. })) => {
            miette::miette!(
                help = "override files must be a TOML table or JSON object",
                "{}",
                err
            )
        }
        CliError::Producer(ProducerError::Reduce(err)) => miette::miette!(
            help = "a handler registered for this extension point failed",
            "{}",
            err
        ),
        other => miette::miette!("{}", other),
    }
}
