//! Storage path resolution.
//!
//! Settings live at `<root>/<vendor>/<product>/<filename>`, where `<root>` is
//! the platform's local data directory (`~/.local/share` on Linux,
//! `%LOCALAPPDATA%` on Windows) unless an explicit directory overrides it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SettingsError};

/// A resolved settings file and the directory containing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub file: PathBuf,
    pub dir: PathBuf,
}

/// Base directory every storage location is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Root {
    /// The platform local data directory.
    #[default]
    Platform,
    /// An explicit directory, e.g. from configuration or tests.
    Dir(PathBuf),
}

/// Computes storage locations under a [`Root`].
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    root: Root,
}

impl PathResolver {
    pub fn new(root: Root) -> Self {
        Self { root }
    }

    /// Resolver rooted at the platform local data directory.
    pub fn platform() -> Self {
        Self::new(Root::Platform)
    }

    /// Resolver rooted at `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Root::Dir(dir.into()))
    }

    /// Returns the base directory.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoBaseDirectory`] if the platform's local
    /// data directory cannot be determined.
    pub fn root_dir(&self) -> Result<PathBuf> {
        match &self.root {
            Root::Platform => dirs::data_local_dir().ok_or(SettingsError::NoBaseDirectory),
            Root::Dir(dir) => Ok(dir.clone()),
        }
    }

    /// Joins the path segments without touching the filesystem.
    ///
    /// Used for the legacy location, which is never written to.
    pub fn locate(&self, vendor: &str, product: &str, filename: &str) -> Result<StorageLocation> {
        let dir = self.root_dir()?.join(vendor).join(product);
        let file = dir.join(filename);
        Ok(StorageLocation { file, dir })
    }

    /// Joins the path segments and makes sure the parent directory exists.
    ///
    /// Safe to call repeatedly: an existing directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoBaseDirectory`] if the root is unknown, or
    /// [`SettingsError::CreateDir`] if the directory cannot be created.
    pub fn resolve(&self, vendor: &str, product: &str, filename: &str) -> Result<StorageLocation> {
        let location = self.locate(vendor, product, filename)?;
        ensure_dir(&location.dir)?;
        Ok(location)
    }
}

/// Creates `dir` and any missing parents.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    debug!(dir = %dir.display(), "creating settings directory");
    fs::create_dir_all(dir).map_err(|source| SettingsError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
