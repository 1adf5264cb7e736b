use packrig_config::ConfigError;
use packrig_producers::ProducerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevError {
    #[error("target '{0}' is not registered")]
    TargetNotFound(String),

    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Producer(#[from] ProducerError),

    #[error("bundler failed to create a compiler: {0}")]
    Bundler(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<ConfigError> for DevError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::TargetNotFound(name) => DevError::TargetNotFound(name),
            other => DevError::Config(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DevError>;
