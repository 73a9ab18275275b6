//! Condor CLI binary.
//!
//! Entry point for the `condor` command-line tool. It loads the global
//! configuration, initializes logging via `tracing`, parses arguments with
//! `clap`, and dispatches to the appropriate command handler.

mod cli;
mod commands;

use condor_core::config::GlobalConfig;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::parse();
    let config = GlobalConfig::load()?;

    // RUST_LOG wins, then --verbose, then `[log] filter` from the config.
    let fallback = if args.verbose {
        "debug".to_string()
    } else {
        config.log.filter.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::dispatch(args, &config)
}
