use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReduceError>;

#[derive(Debug, Error)]
pub enum ReduceError {
    /// A handler returned an error. The whole reduction is aborted.
    #[error("handler #{index} for extension point '{point}' failed: {source}")]
    Handler {
        point: String,
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A handler was registered for a different value or context type than the
    /// one being reduced through its extension point.
    #[error("extension point '{point}' reduces {expected}, but a handler was registered for {registered}")]
    TypeMismatch {
        point: String,
        expected: String,
        registered: String,
    },
}

impl ReduceError {
    /// The extension point the error was raised at.
    pub fn point(&self) -> &str {
        match self {
            ReduceError::Handler { point, .. } | ReduceError::TypeMismatch { point, .. } => point,
        }
    }
}
