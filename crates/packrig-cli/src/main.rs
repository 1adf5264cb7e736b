//! `packrig` command-line entry point.

use std::io;
use std::sync::Arc;

use clap::Parser;
use miette::Result;
use packrig_cli::{Cli, cli_error_to_miette, commands, logger};
use packrig_reducer::ReducerPipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli, Arc::new(ReducerPipeline::empty()), &mut out).map_err(cli_error_to_miette)
}
