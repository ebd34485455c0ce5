#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for browsing and editing warehouse cell inventory.

mod cli;
mod config;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Entry point for the warehouse grid command-line interface.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    cli::run(cli::Cli::parse(), &mut stdout.lock())
}
