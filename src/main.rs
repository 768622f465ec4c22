//! Entry point for kiroku, a command-line front end to the settings store.
//!
//! This binary loads environment variables, installs logging, parses CLI
//! arguments via [`cli`], and dispatches to the appropriate subcommand handler.

mod cli;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Runs the kiroku CLI.
///
/// Loads `.env` files (silently ignored if absent), routes `tracing` output
/// to stderr filtered by `RUST_LOG`, parses command-line arguments into a
/// [`cli::Cli`] struct, and dispatches the chosen subcommand via [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(kiroku::constants::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::parse();
    cli::run(cli).await
}
