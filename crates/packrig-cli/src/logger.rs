//! Logging setup for the `packrig` binary.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: &[&str] = &[
    "packrig",
    "packrig_cli",
    "packrig_config",
    "packrig_dev",
    "packrig_producers",
    "packrig_reducer",
];

fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
///
/// `verbose` wins over `quiet`. Without either flag `RUST_LOG` is honoured,
/// falling back to warnings only.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new(directives("debug"))
    } else if quiet {
        EnvFilter::new(directives("error"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives("warn")))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_every_crate() {
        let directives = directives("debug");
        assert!(directives.contains("packrig_producers=debug"));
        assert!(directives.contains("packrig_dev=debug"));
        assert_eq!(directives.matches('=').count(), CRATES.len());
    }
}
