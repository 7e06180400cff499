mod app;
mod banner;
mod cli;
mod commands;
mod config;
mod deck;
mod playback;
mod scene;
mod sync;
mod theme;
mod trigger;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

/// RUST_LOG wins over the verbosity flags when it is set.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scenedeck={level}")));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, cli.quiet);

    cli.run()
}
