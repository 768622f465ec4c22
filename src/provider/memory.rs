//! In-memory storage backend.
//!
//! Documents are kept per path in a map, so the same load/save/migrate code
//! paths can run without a filesystem. Read counts per path are recorded,
//! which lets callers assert which locations a procedure touched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::StorageBackend;
use crate::error::Result;
use crate::value::SettingsMap;

#[derive(Default)]
struct Inner {
    documents: HashMap<PathBuf, SettingsMap>,
    reads: HashMap<PathBuf, usize>,
    writes: HashMap<PathBuf, usize>,
}

/// A [`StorageBackend`] holding documents in memory.
pub struct MemoryStore {
    default_path: PathBuf,
    available: bool,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// A store whose default document lives at `default_path`.
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: default_path.into(),
            available: true,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A store that reports itself unavailable and never writes its default.
    pub fn unavailable(default_path: impl Into<PathBuf>) -> Self {
        Self {
            available: false,
            ..Self::new(default_path)
        }
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// Seeds a document at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, map: SettingsMap) {
        self.lock().documents.insert(path.into(), map);
    }

    /// The document currently stored at `path`.
    pub fn document(&self, path: &Path) -> Option<SettingsMap> {
        self.lock().documents.get(path).cloned()
    }

    /// How many times `path` has been read.
    pub fn reads(&self, path: &Path) -> usize {
        self.lock().reads.get(path).copied().unwrap_or(0)
    }

    /// How many times `path` has been written.
    pub fn writes(&self, path: &Path) -> usize {
        self.lock().writes.get(path).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self, path: &Path) -> Option<SettingsMap> {
        let mut inner = self.lock();
        *inner.reads.entry(path.to_path_buf()).or_default() += 1;
        inner.documents.get(path).cloned()
    }

    fn write(&self, path: &Path, map: &SettingsMap) {
        let mut inner = self.lock();
        *inner.writes.entry(path.to_path_buf()).or_default() += 1;
        inner.documents.insert(path.to_path_buf(), map.clone());
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStore {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn save_default(&self, map: &SettingsMap) -> Result<()> {
        if self.available {
            self.write(&self.default_path, map);
        }
        Ok(())
    }

    async fn save_to(&self, map: &SettingsMap, path: &Path) -> Result<()> {
        self.write(path, map);
        Ok(())
    }

    async fn load_default(&self) -> Result<Option<SettingsMap>> {
        if !self.available {
            return Ok(None);
        }
        Ok(self.read(&self.default_path))
    }

    async fn load_from(&self, path: &Path) -> Result<Option<SettingsMap>> {
        Ok(self.read(path))
    }

    async fn default_exists(&self) -> bool {
        self.available && self.lock().documents.contains_key(&self.default_path)
    }

    async fn exists(&self, path: &Path) -> bool {
        self.lock().documents.contains_key(path)
    }
}
