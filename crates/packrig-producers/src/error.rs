use packrig_config::ConfigError;
use packrig_reducer::ReduceError;
use thiserror::Error;

/// Errors raised while producing a bundler configuration
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    /// A merged or overridden document no longer fits the configuration schema
    #[error("configuration from '{producer}' does not match the bundler schema: {source}")]
    Shape {
        producer: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no producer registered under '{0}'")]
    UnknownProducer(String),
}

pub type Result<T> = std::result::Result<T, ProducerError>;
