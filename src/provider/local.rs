//! File-backed settings under the local data directory.
//!
//! [`LocalStore`] reads and writes a single settings document;
//! [`LocalSettingsProvider`] wraps it in a [`DictionaryProvider`] and adds the
//! load-or-migrate startup step plus the availability flag.
//!
//! Saves go to a hidden temporary sibling (`.<name>.<uuid>.tmp`) which is
//! flushed and renamed over the target, so a failed write never leaves a
//! truncated settings file behind.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use super::{DictionaryProvider, StorageBackend};
use crate::constants::{
    DEFAULT_ORIGINAL_PRODUCT, DEFAULT_ORIGINAL_VENDOR, DEFAULT_PRODUCT, DEFAULT_VENDOR,
    FILE_CHANGE_THROTTLE_MS, SETTINGS_FILE_STEM,
};
use crate::error::{Result, SettingsError};
use crate::migrate::{self, MigrationOutcome};
use crate::paths::{self, PathResolver, Root, StorageLocation};
use crate::serializer::{Format, Serializer};
use crate::value::{KnownTypes, SettingsMap};

/// Where and how a [`LocalSettingsProvider`] stores its document.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub root: Root,
    pub vendor: String,
    pub product: String,
    /// Vendor directory of the pre-rebrand location.
    pub original_vendor: String,
    /// Product directory of the pre-rebrand location.
    pub original_product: String,
    pub filename: String,
    pub format: Format,
    /// Debounce interval for callers watching the settings file.
    pub throttle: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        let format = Format::default();
        Self {
            root: Root::Platform,
            vendor: DEFAULT_VENDOR.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            original_vendor: DEFAULT_ORIGINAL_VENDOR.to_string(),
            original_product: DEFAULT_ORIGINAL_PRODUCT.to_string(),
            filename: format!("{}.{}", SETTINGS_FILE_STEM, format.extension()),
            format,
            throttle: Duration::from_millis(FILE_CHANGE_THROTTLE_MS),
        }
    }
}

/// A [`StorageBackend`] persisting one document per file.
pub struct LocalStore {
    location: Option<StorageLocation>,
    serializer: Arc<dyn Serializer>,
}

impl LocalStore {
    /// Creates a store for `location`; `None` makes it permanently unavailable.
    pub fn new(location: Option<StorageLocation>, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            location,
            serializer,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.location.as_ref().map(|l| l.file.as_path())
    }

    pub fn format(&self) -> Format {
        self.serializer.format()
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStore {
    fn is_available(&self) -> bool {
        self.location.is_some()
    }

    async fn save_default(&self, map: &SettingsMap) -> Result<()> {
        match &self.location {
            Some(location) => self.save_to(map, &location.file).await,
            None => Ok(()),
        }
    }

    async fn save_to(&self, map: &SettingsMap, path: &Path) -> Result<()> {
        let bytes = self.serializer.encode(map)?;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_document(&path, &bytes)).await?
    }

    async fn load_default(&self) -> Result<Option<SettingsMap>> {
        match &self.location {
            Some(location) => self.load_from(&location.file).await,
            None => Ok(None),
        }
    }

    async fn load_from(&self, path: &Path) -> Result<Option<SettingsMap>> {
        if path.parent().is_none() {
            warn!(path = %path.display(), "settings path has no parent directory");
            return Ok(None);
        }
        let path = path.to_path_buf();
        let serializer = Arc::clone(&self.serializer);
        tokio::task::spawn_blocking(move || read_document(&path, serializer.as_ref())).await?
    }

    async fn default_exists(&self) -> bool {
        match &self.location {
            Some(location) => self.exists(&location.file).await,
            None => false,
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// Replaces `path` with `bytes` via a temporary sibling and a rename.
///
/// A path without a parent, or a parent that cannot be created, skips the
/// write with a warning instead of failing.
fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    let Some(dir) = path.parent() else {
        warn!(path = %path.display(), "settings path has no parent directory, skipping save");
        return Ok(());
    };
    if let Err(e) = paths::ensure_dir(dir) {
        warn!(error = %e, "skipping settings save");
        return Ok(());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    written.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Reads and decodes `path`; a missing file is `None`.
fn read_document(path: &Path, serializer: &dyn Serializer) -> Result<Option<SettingsMap>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serializer.parse(&bytes).map(Some)
}

/// The application's settings, stored under the local data directory.
///
/// Availability is decided once, at construction: if the storage directory
/// cannot be resolved or created, every later save and load is a no-op and
/// the settings only live in memory for this process.
pub struct LocalSettingsProvider {
    inner: DictionaryProvider<LocalStore>,
    legacy: Option<StorageLocation>,
    throttle: Duration,
}

impl LocalSettingsProvider {
    pub fn new(options: &StoreOptions, known: KnownTypes) -> Self {
        let resolver = PathResolver::new(options.root.clone());
        let location = match resolver.resolve(&options.vendor, &options.product, &options.filename)
        {
            Ok(location) => {
                info!(path = %location.file.display(), "settings location resolved");
                Some(location)
            }
            Err(e) => {
                warn!(error = %e, "settings storage unavailable, changes will not persist");
                None
            }
        };
        let legacy = resolver
            .locate(
                &options.original_vendor,
                &options.original_product,
                &options.filename,
            )
            .ok();

        let store = LocalStore::new(location, options.format.serializer());
        Self {
            inner: DictionaryProvider::new(store, Arc::new(known)),
            legacy,
            throttle: options.throttle,
        }
    }

    /// Whether the storage directory could be resolved. Never changes.
    pub fn available(&self) -> bool {
        self.inner.backend().is_available()
    }

    /// The settings file, when available.
    pub fn file_path(&self) -> Option<&Path> {
        self.inner.backend().file_path()
    }

    /// The pre-rebrand settings file, read once during migration.
    pub fn legacy_path(&self) -> Option<&Path> {
        self.legacy.as_ref().map(|l| l.file.as_path())
    }

    pub fn format(&self) -> Format {
        self.inner.backend().format()
    }

    /// Debounce interval for reacting to external changes of the settings file.
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Loads the current settings, migrating from the legacy location on
    /// first run. See [`migrate::load_or_migrate`].
    pub async fn load_or_migrate(&self) -> Result<MigrationOutcome> {
        migrate::load_or_migrate(&self.inner, self.legacy_path()).await
    }
}

impl Deref for LocalSettingsProvider {
    type Target = DictionaryProvider<LocalStore>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
