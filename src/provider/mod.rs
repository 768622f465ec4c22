//! The settings provider and its storage backends.
//!
//! [`DictionaryProvider`] owns the in-memory [`SettingsMap`] and delegates
//! byte-level persistence to a [`StorageBackend`]. [`LocalStore`] persists to
//! a file under the local data directory; [`MemoryStore`] keeps documents in
//! memory. Migration logic (see [`crate::migrate`]) only talks to the trait,
//! so either backend can sit underneath it.

pub mod local;
pub mod memory;

pub use local::{LocalSettingsProvider, LocalStore};
pub use memory::MemoryStore;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::value::{KnownTypes, SettingValue, SettingsMap};

/// Persistence primitives a provider delegates to.
///
/// Loads return `Ok(None)` when the target does not exist; only genuine I/O
/// or decoding failures are errors. The provider checks every loaded map
/// against its [`KnownTypes`], so backends need not.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Whether the default location is usable. Fixed for the backend's lifetime.
    fn is_available(&self) -> bool;

    /// Writes the whole map to the default location.
    async fn save_default(&self, map: &SettingsMap) -> Result<()>;

    /// Writes the whole map to an explicit path.
    async fn save_to(&self, map: &SettingsMap, path: &Path) -> Result<()>;

    /// Reads the default location.
    async fn load_default(&self) -> Result<Option<SettingsMap>>;

    /// Reads an explicit path.
    async fn load_from(&self, path: &Path) -> Result<Option<SettingsMap>>;

    /// Whether a document exists at the default location.
    async fn default_exists(&self) -> bool;

    /// Whether a document exists at `path`.
    async fn exists(&self, path: &Path) -> bool;
}

/// In-memory settings backed by a [`StorageBackend`].
///
/// The map sits behind a fair async mutex that is held for the whole of
/// every load, save, import and export, so at most one file operation per
/// provider is in flight and waiting callers are served in FIFO order.
/// Accessors take the same lock.
///
/// A failed [`load`](Self::load) blocks [`save`](Self::save) until a later
/// load succeeds, so an unreadable document is never replaced by whatever
/// happens to be in memory.
pub struct DictionaryProvider<B> {
    backend: B,
    known: Arc<KnownTypes>,
    map: Mutex<SettingsMap>,
    load_failed: AtomicBool,
}

impl<B: StorageBackend> DictionaryProvider<B> {
    pub fn new(backend: B, known: Arc<KnownTypes>) -> Self {
        Self {
            backend,
            known,
            map: Mutex::new(SettingsMap::new()),
            load_failed: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn known_types(&self) -> &KnownTypes {
        &self.known
    }

    /// Whether the last load failed. Saves are refused while this holds.
    pub fn load_failed(&self) -> bool {
        self.load_failed.load(Ordering::Acquire)
    }

    /// Reads `path` (or the default location) and checks it against the registry.
    async fn read_checked(&self, path: Option<&Path>) -> Result<Option<SettingsMap>> {
        let loaded = match path {
            Some(path) => self.backend.load_from(path).await?,
            None => self.backend.load_default().await?,
        };
        if let Some(ref map) = loaded {
            self.known.validate(map)?;
        }
        Ok(loaded)
    }

    /// Replaces the map with the contents of the default location.
    ///
    /// A missing document, or an unavailable backend, leaves an empty map.
    /// On error the map is left as it was and saving is blocked.
    pub async fn load(&self) -> Result<()> {
        let mut map = self.map.lock().await;
        match self.read_checked(None).await {
            Ok(loaded) => {
                *map = loaded.unwrap_or_default();
                self.load_failed.store(false, Ordering::Release);
                debug!(entries = map.len(), "settings loaded");
                Ok(())
            }
            Err(e) => {
                self.load_failed.store(true, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Persists the whole map to the default location.
    ///
    /// Succeeds without writing anything when the backend is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::LoadFailed`] if the last load failed.
    pub async fn save(&self) -> Result<()> {
        let map = self.map.lock().await;
        if self.load_failed() {
            return Err(SettingsError::LoadFailed);
        }
        if !self.backend.is_available() {
            debug!("settings storage unavailable, skipping save");
            return Ok(());
        }
        self.backend.save_default(&map).await?;
        debug!(entries = map.len(), "settings saved");
        Ok(())
    }

    /// Replaces the map with the document at `path` without persisting it.
    ///
    /// Returns `false`, leaving the map untouched, if no document exists there.
    pub async fn import(&self, path: &Path) -> Result<bool> {
        let mut map = self.map.lock().await;
        match self.read_checked(Some(path)).await? {
            Some(imported) => {
                debug!(path = %path.display(), entries = imported.len(), "settings imported");
                *map = imported;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Writes a copy of the map to `path`. The default location is untouched.
    pub async fn export(&self, path: &Path) -> Result<()> {
        let map = self.map.lock().await;
        self.backend.save_to(&map, path).await
    }

    pub async fn get(&self, key: &str) -> Option<SettingValue> {
        self.map.lock().await.get(key).cloned()
    }

    /// Sets `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Rejects structured values whose kind is not in the known-type registry.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<SettingValue>,
    ) -> Result<Option<SettingValue>> {
        let key = key.into();
        let value = value.into();
        self.known.check(&key, &value)?;
        Ok(self.map.lock().await.insert(key, value))
    }

    pub async fn remove(&self, key: &str) -> Option<SettingValue> {
        self.map.lock().await.remove(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.map.lock().await.keys().cloned().collect()
    }

    /// A detached copy of the current map.
    pub async fn snapshot(&self) -> SettingsMap {
        self.map.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.map.lock().await.is_empty()
    }

    /// Empties the in-memory map. Nothing is persisted.
    pub async fn clear(&self) {
        self.map.lock().await.clear();
    }
}

#[cfg(test)]
mod tests;
