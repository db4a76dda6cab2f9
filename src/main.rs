//! SizeScope: disk usage scanner.
//!
//! Thin binary entry point. All logic lives in the `sizescope-core`
//! and `sizescope-cli` crates.

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = sizescope_cli::Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("SizeScope starting");

    sizescope_cli::run(cli)
}
