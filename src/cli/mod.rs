//! Command-line interface definition and dispatch for kiroku.
//!
//! Uses [`clap`] for argument parsing with derive macros. Each subcommand is
//! routed to its handler; settings operations live in the [`settings`]
//! submodule.

mod kinds;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use kiroku::config::Config;
use kiroku::SettingsRoot;

/// Top-level CLI structure for kiroku.
///
/// Parsed from command-line arguments via [`clap::Parser`]. Global options
/// pick the configuration and storage root; the subcommand picks the action.
#[derive(Parser)]
#[command(name = "kiroku", about = "Inspect and edit persistent application settings")]
pub struct Cli {
    /// Config file to use instead of ~/.config/kiroku/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Storage root replacing the platform local data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the kiroku CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Show where settings are stored
    Path,
    /// List all settings
    Show,
    /// Print a single setting
    Get { key: String },
    /// Set a setting and save
    Set {
        key: String,
        value: String,
        /// How to interpret VALUE (inferred when omitted)
        #[arg(short, long, value_enum)]
        kind: Option<ValueKind>,
    },
    /// Remove a setting and save
    Remove { key: String },
    /// Write a copy of the settings to a file
    Export { path: PathBuf },
    /// Replace the settings with the contents of a file
    Import {
        path: PathBuf,
        /// Keep the imported settings in memory only
        #[arg(long)]
        no_save: bool,
    },
    /// Run the first-start migration and report what happened
    Migrate,
}

/// Interpretation of a `set` value.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    /// Keyboard shortcut, e.g. Ctrl+Alt+Left
    Shortcut,
    /// Window placement as x,y,width,height
    Bounds,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
///
/// Builds the process-wide [`SettingsRoot`] from configuration, then routes
/// each [`Commands`] variant to the settings handlers.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir.display().to_string());
    }
    let root = SettingsRoot::new(config.store_options(), kinds::known_types());

    match cli.command {
        Commands::Path => settings::show_paths(&root),
        Commands::Migrate => settings::migrate(&root).await,
        Commands::Show => settings::show(&root).await,
        Commands::Get { key } => settings::get(&root, &key).await,
        Commands::Set { key, value, kind } => settings::set(&root, key, &value, kind).await,
        Commands::Remove { key } => settings::remove(&root, &key).await,
        Commands::Export { path } => settings::export(&root, &path).await,
        Commands::Import { path, no_save } => settings::import(&root, &path, !no_save).await,
    }
}
