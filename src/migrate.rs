//! First-run migration from the pre-rebrand storage location.
//!
//! On startup the current document wins if it exists. Otherwise a document
//! at the legacy location is imported and immediately saved to the current
//! location. The legacy document is only ever read, so the procedure
//! repeats on every start until the first successful save.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::provider::{DictionaryProvider, StorageBackend};

/// What [`load_or_migrate`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The current document existed and was loaded.
    Loaded,
    /// The legacy document was imported and saved to the current location.
    Migrated { from: PathBuf },
    /// Neither document existed; settings start empty.
    Fresh,
    /// The legacy document could not be read; settings start empty.
    Abandoned { from: PathBuf, reason: String },
    /// Loading failed outright. Produced by [`crate::SettingsRoot::startup`];
    /// settings start empty and saving stays blocked.
    Failed { reason: String },
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => write!(f, "loaded existing settings"),
            Self::Migrated { from } => write!(f, "migrated settings from {}", from.display()),
            Self::Fresh => write!(f, "no settings found, starting fresh"),
            Self::Abandoned { from, reason } => {
                write!(f, "could not migrate {} ({}), starting fresh", from.display(), reason)
            }
            Self::Failed { reason } => {
                write!(f, "could not load settings ({}), changes will not be saved", reason)
            }
        }
    }
}

/// Loads the provider's settings, migrating from `legacy` when the current
/// location holds no document yet.
///
/// The legacy check runs even when the backend is unavailable; the imported
/// settings then stay in memory only, since the follow-up save is inert.
///
/// # Errors
///
/// Errors loading the current document or saving the migrated one propagate.
/// A legacy document that cannot be imported is reported as
/// [`MigrationOutcome::Abandoned`] instead, so startup can continue.
pub async fn load_or_migrate<B: StorageBackend>(
    provider: &DictionaryProvider<B>,
    legacy: Option<&Path>,
) -> Result<MigrationOutcome> {
    let backend = provider.backend();
    if backend.is_available() && backend.default_exists().await {
        provider.load().await?;
        return Ok(MigrationOutcome::Loaded);
    }

    if let Some(legacy) = legacy {
        if backend.exists(legacy).await {
            match provider.import(legacy).await {
                Ok(true) => {
                    provider.save().await?;
                    info!(from = %legacy.display(), "migrated legacy settings");
                    return Ok(MigrationOutcome::Migrated {
                        from: legacy.to_path_buf(),
                    });
                }
                // Removed between the existence check and the read.
                Ok(false) => {}
                Err(e) => {
                    warn!(from = %legacy.display(), error = %e, "legacy settings unreadable");
                    provider.clear().await;
                    return Ok(MigrationOutcome::Abandoned {
                        from: legacy.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    provider.load().await?;
    Ok(MigrationOutcome::Fresh)
}
