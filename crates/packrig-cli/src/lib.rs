//! Library half of the `packrig` binary.
//!
//! Programs that register their own extension handlers can build a
//! [`ReducerPipeline`](packrig_reducer::ReducerPipeline) and call
//! [`commands::run`] with it instead of going through the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;

pub use cli::Cli;
pub use error::{CliError, Result, cli_error_to_miette};
