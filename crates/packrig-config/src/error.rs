//! Error types for settings loading, parameter validation and override files.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Settings loading errors
    #[error("settings file not found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("target '{0}' is not registered")]
    TargetNotFound(String),

    #[error("invalid config value for '{field}'{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    // Parameter validation errors
    #[error("invalid build parameters: {field} {message}")]
    InvalidParams { field: String, message: String },

    // Override file errors (the file exists but cannot be used)
    #[error("failed to load override file {}: {message}", .path.display())]
    OverrideLoad { path: PathBuf, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid_params(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidParams {
            field: field.into(),
            message: message.into(),
        }
    }
}
