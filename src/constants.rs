//! Centralized constants for kiroku.
//!
//! Default identities, filenames, and timing constants live here so they
//! can be changed in one place.

/// Application name used in CLI output and the config directory path.
pub const APP_NAME: &str = "kiroku";

/// Configuration filename under the platform config directory.
pub const CONFIG_FILENAME: &str = "config.toml";

// --- Storage identity ---

/// Vendor directory of the current storage location.
pub const DEFAULT_VENDOR: &str = "kiroku-project";

/// Product directory of the current storage location.
pub const DEFAULT_PRODUCT: &str = "kiroku";

/// Vendor directory used before the rebrand. Only ever read from.
pub const DEFAULT_ORIGINAL_VENDOR: &str = "fudebako";

/// Product directory used before the rebrand. Only ever read from.
pub const DEFAULT_ORIGINAL_PRODUCT: &str = "fudebako";

/// Stem of the settings filename; the extension comes from the format.
pub const SETTINGS_FILE_STEM: &str = "settings";

// --- File watching ---

/// Debounce interval, in milliseconds, before reacting to a change
/// notification for the settings file.
pub const FILE_CHANGE_THROTTLE_MS: u64 = 1500;

/// File-dialog filter string for every format kiroku can read and write.
pub const SUPPORTED_FORMATS: &str = "JSON (*.json)|*.json|TOML (*.toml)|*.toml";

// --- Environment ---

/// Environment variable overriding the storage root directory.
pub const DATA_DIR_ENV: &str = "KIROKU_DATA_DIR";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";
