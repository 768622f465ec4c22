//! Settings CLI operations for kiroku.
//!
//! Every handler except `path` starts the provider through
//! [`SettingsRoot::startup`], so the first invocation after a rebrand
//! migrates legacy settings just like the application would.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use kiroku::migrate::MigrationOutcome;
use kiroku::{Format, LocalSettingsProvider, SettingValue, SettingsRoot};

use super::kinds;
use super::ValueKind;

/// Prints the current and legacy locations plus availability.
pub(crate) fn show_paths(root: &SettingsRoot) -> Result<()> {
    let provider = root.provider();
    match provider.file_path() {
        Some(path) => println!("{} {}", "Settings:".bold(), path.display()),
        None => println!(
            "{} {}",
            "Settings:".bold(),
            "unavailable (changes will not persist)".red()
        ),
    }
    match provider.legacy_path() {
        Some(path) => println!("{} {}", "Legacy:".bold(), path.display().to_string().dimmed()),
        None => println!("{} {}", "Legacy:".bold(), "unknown".dimmed()),
    }
    println!("{} {}", "Format:".bold(), provider.format());
    println!(
        "{} {} ms",
        "Throttle:".bold(),
        provider.throttle().as_millis()
    );
    Ok(())
}

/// Runs load-or-migrate and reports the outcome, failing on load errors.
pub(crate) async fn migrate(root: &SettingsRoot) -> Result<()> {
    let provider = root.provider();
    let outcome = provider
        .load_or_migrate()
        .await
        .context("Failed to load settings")?;
    report(&outcome);
    if matches!(outcome, MigrationOutcome::Loaded | MigrationOutcome::Fresh) {
        println!("{}", outcome.to_string().dimmed());
    }
    println!("{} {} settings", "total:".dimmed(), provider.len().await);
    Ok(())
}

/// Lists every setting with its type.
pub(crate) async fn show(root: &SettingsRoot) -> Result<()> {
    let provider = start(root).await?;
    let settings = provider.snapshot().await;
    if settings.is_empty() {
        println!("{}", "No settings stored.".dimmed());
        println!("Add one with: {}", "kiroku set <key> <value>".cyan());
        return Ok(());
    }

    let key_width = settings.keys().map(|k| k.chars().count()).max().unwrap_or(3).max(3);
    let type_width = settings
        .values()
        .map(|v| v.type_name().len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!(
        "{} {} {}",
        format!("{:<kw$}", "KEY", kw = key_width).bold(),
        format!("{:<tw$}", "TYPE", tw = type_width).bold(),
        "VALUE".bold(),
    );
    println!("{}", "-".repeat(key_width + type_width + 12));
    for (key, value) in &settings {
        // Pad first, then colorize to avoid ANSI escape code width issues
        let key_col = format!("{:<kw$}", key, kw = key_width);
        let type_col = format!("{:<tw$}", value.type_name(), tw = type_width);
        println!("{} {} {}", key_col.cyan(), type_col.dimmed(), value);
    }
    println!();
    println!("{} {} settings", "total:".dimmed(), settings.len());
    Ok(())
}

pub(crate) async fn get(root: &SettingsRoot, key: &str) -> Result<()> {
    let provider = start(root).await?;
    let value = provider
        .get(key)
        .await
        .ok_or_else(|| anyhow::anyhow!("No setting named '{}'", key))?;
    println!("{}", value);
    Ok(())
}

pub(crate) async fn set(
    root: &SettingsRoot,
    key: String,
    raw: &str,
    kind: Option<ValueKind>,
) -> Result<()> {
    let value = parse_value(raw, kind)?;
    let provider = start(root).await?;
    let previous = provider.set(key.clone(), value.clone()).await?;
    save(&provider).await?;
    match previous {
        Some(old) if old != value => println!(
            "{} = {} {}",
            key.cyan(),
            value,
            format!("(was {})", old).dimmed()
        ),
        _ => println!("{} = {}", key.cyan(), value),
    }
    Ok(())
}

pub(crate) async fn remove(root: &SettingsRoot, key: &str) -> Result<()> {
    let provider = start(root).await?;
    if provider.remove(key).await.is_none() {
        bail!("No setting named '{}'", key);
    }
    save(&provider).await?;
    println!("{} {}", "Removed".green(), key);
    Ok(())
}

pub(crate) async fn export(root: &SettingsRoot, path: &Path) -> Result<()> {
    let provider = start(root).await?;
    check_format(&provider, path)?;
    provider
        .export(path)
        .await
        .with_context(|| format!("Failed to export settings to {:?}", path))?;
    if !path.exists() {
        bail!(
            "Nothing written: could not create the directory for {:?}",
            path
        );
    }
    println!(
        "{} {} settings to {}",
        "Exported".green(),
        provider.len().await,
        path.display()
    );
    Ok(())
}

pub(crate) async fn import(root: &SettingsRoot, path: &Path, persist: bool) -> Result<()> {
    let provider = start(root).await?;
    check_format(&provider, path)?;
    let imported = provider
        .import(path)
        .await
        .with_context(|| format!("Failed to import settings from {:?}", path))?;
    if !imported {
        bail!("No settings file at {:?}", path);
    }
    if persist {
        save(&provider).await?;
    }
    println!(
        "{} {} settings from {}{}",
        "Imported".green(),
        provider.len().await,
        path.display(),
        if persist { "" } else { " (not saved)" }
    );
    Ok(())
}

/// Builds the provider and runs the startup load, reporting migrations.
///
/// Fails if the stored settings could not be loaded, so no command works
/// from (or saves over) a document it could not read.
async fn start(root: &SettingsRoot) -> Result<Arc<LocalSettingsProvider>> {
    let (provider, outcome) = root.startup().await;
    if let MigrationOutcome::Failed { reason } = &outcome {
        let location = provider
            .file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        bail!("Failed to load settings from {}: {}", location, reason);
    }
    report(&outcome);
    Ok(provider)
}

/// Prints migration outcomes worth telling the user about.
fn report(outcome: &MigrationOutcome) {
    match outcome {
        MigrationOutcome::Migrated { .. } => println!("{} {}", "migrated:".green(), outcome),
        MigrationOutcome::Abandoned { .. } => eprintln!("{} {}", "warning:".yellow(), outcome),
        MigrationOutcome::Loaded | MigrationOutcome::Fresh | MigrationOutcome::Failed { .. } => {}
    }
}

async fn save(provider: &LocalSettingsProvider) -> Result<()> {
    if !provider.available() {
        eprintln!(
            "{} settings storage is unavailable, change kept for this run only",
            "warning:".yellow()
        );
    }
    provider.save().await.context("Failed to save settings")
}

/// Import and export reuse the store's codec, so the file extension must match.
fn check_format(provider: &LocalSettingsProvider, path: &Path) -> Result<()> {
    let expected = provider.format();
    match Format::from_path(path) {
        Some(found) if found == expected => Ok(()),
        _ => bail!(
            "Expected a .{} file for {} settings, got {:?}",
            expected.extension(),
            expected,
            path
        ),
    }
}

fn parse_value(raw: &str, kind: Option<ValueKind>) -> Result<SettingValue> {
    let value = match kind {
        None => SettingValue::parse_literal(raw),
        Some(ValueKind::Bool) => SettingValue::Bool(
            raw.parse()
                .with_context(|| format!("'{}' is not true or false", raw))?,
        ),
        Some(ValueKind::Int) => SettingValue::Int(
            raw.parse()
                .with_context(|| format!("'{}' is not an integer", raw))?,
        ),
        Some(ValueKind::Float) => {
            let x: f64 = raw
                .parse()
                .with_context(|| format!("'{}' is not a number", raw))?;
            if !x.is_finite() {
                bail!("'{}' is not a finite number", raw);
            }
            SettingValue::Float(x)
        }
        Some(ValueKind::String) => SettingValue::Text(raw.to_string()),
        Some(ValueKind::Shortcut) => kinds::parse_shortcut(raw)?,
        Some(ValueKind::Bounds) => kinds::parse_bounds(raw)?,
    };
    Ok(value)
}
