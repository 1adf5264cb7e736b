//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use packrig_config::Mode;

/// packrig - bundler configuration for node and browser targets
#[derive(Parser, Debug)]
#[command(name = "packrig", version, about)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root containing packrig.toml
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the final bundler configuration for a target as JSON
    Config(ConfigArgs),

    /// List configured targets
    Targets,

    /// Validate settings and produce every target's configuration
    Check,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Target name from packrig.toml
    pub target: String,

    #[arg(short, long, value_enum, default_value_t = ModeArg::Development)]
    pub mode: ModeArg,

    /// Content hash embedded in production filenames
    #[arg(long)]
    pub hash: Option<String>,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "prod")]
    Production,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_config_command() {
        let cli = Cli::try_parse_from(["packrig", "config", "web", "--mode", "prod", "--hash", "abc"])
            .unwrap();
        match cli.command {
            Command::Config(args) => {
                assert_eq!(args.target, "web");
                assert_eq!(Mode::from(args.mode), Mode::Production);
                assert_eq!(args.hash.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["packrig", "-v", "-q", "targets"]).is_err());
    }
}
