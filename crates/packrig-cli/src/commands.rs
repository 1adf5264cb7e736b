//! Command implementations.

use std::io::Write;
use std::sync::Arc;

use packrig_config::{ConfigurationParams, Mode, ProjectSettings, SettingsStore, Validate};
use packrig_producers::{BundlerConfig, ProducerRegistry};
use packrig_reducer::ReducerPipeline;
use tracing::{debug, info};

use crate::cli::{Cli, Command, ConfigArgs};
use crate::error::Result;

/// Run a parsed command line, writing command output to `out`.
///
/// `pipeline` carries whatever extension handlers the embedding program
/// registered; the `packrig` binary passes an empty one.
pub fn run(cli: &Cli, pipeline: Arc<ReducerPipeline>, out: &mut dyn Write) -> Result<()> {
    let settings = ProjectSettings::load(&cli.root)?;
    let registry = ProducerRegistry::new(pipeline, Some(settings.override_dir()));
    debug!(root = %cli.root.display(), targets = settings.targets.len(), "loaded settings");

    match &cli.command {
        Command::Config(args) => config(&settings, &registry, args, out),
        Command::Targets => targets(&settings, out),
        Command::Check => check(&settings, &registry, out),
    }
}

/// Produce one target's configuration.
pub fn produce(
    settings: &dyn SettingsStore,
    registry: &ProducerRegistry,
    target: &str,
    mode: Mode,
    hash: Option<&str>,
) -> Result<BundlerConfig> {
    let target = settings.require_target(target)?;
    let params = ConfigurationParams::for_target(target, settings.project(), mode, hash);
    Ok(registry.build(&params, mode)?)
}

fn config(
    settings: &ProjectSettings,
    registry: &ProducerRegistry,
    args: &ConfigArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let mode = Mode::from(args.mode);
    let config = produce(settings, registry, &args.target, mode, args.hash.as_deref())?;

    let json = if args.compact {
        serde_json::to_string(&config)?
    } else {
        serde_json::to_string_pretty(&config)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

fn targets(settings: &ProjectSettings, out: &mut dyn Write) -> Result<()> {
    for target in settings.targets.values() {
        writeln!(
            out,
            "{}\t{}\t{}",
            target.name,
            target.environment,
            target.build_folder.display()
        )?;
    }
    Ok(())
}

fn check(settings: &ProjectSettings, registry: &ProducerRegistry, out: &mut dyn Write) -> Result<()> {
    settings.validate()?;

    let mut produced = 0;
    for name in settings.targets.keys() {
        for mode in [Mode::Development, Mode::Production] {
            produce(settings, registry, name, mode, None)?;
            writeln!(out, "ok\t{name}\t{mode}")?;
            produced += 1;
        }
    }

    info!(configurations = produced, "settings check passed");
    writeln!(out, "{produced} configurations produced")?;
    Ok(())
}
