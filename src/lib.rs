//! kiroku, a persistent settings store for desktop applications.
//!
//! Settings are a flat map of named, dynamically-typed values stored in one
//! document under the platform's local data directory. On the first start
//! after an application rebrand, settings found under the old vendor/product
//! directories are migrated into the new location.
//!
//! ```no_run
//! use kiroku::{KnownTypes, SettingsRoot, StoreOptions};
//!
//! # async fn demo() -> kiroku::Result<()> {
//! let root = SettingsRoot::new(StoreOptions::default(), KnownTypes::new());
//! let (settings, _outcome) = root.startup().await;
//! settings.set("theme", "dark").await?;
//! settings.save().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod migrate;
pub mod paths;
pub mod provider;
pub mod serializer;
pub mod value;

pub use error::{Result, SettingsError};
pub use lifecycle::SettingsRoot;
pub use migrate::MigrationOutcome;
pub use paths::{PathResolver, Root, StorageLocation};
pub use provider::local::StoreOptions;
pub use provider::{
    DictionaryProvider, LocalSettingsProvider, LocalStore, MemoryStore, StorageBackend,
};
pub use serializer::{Format, JsonSerializer, Serializer, TomlSerializer};
pub use value::{KnownTypes, SettingValue, SettingsMap};
