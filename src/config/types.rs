//! Struct definitions and serde defaults for kiroku configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ORIGINAL_PRODUCT, DEFAULT_ORIGINAL_VENDOR, DEFAULT_PRODUCT, DEFAULT_VENDOR,
    FILE_CHANGE_THROTTLE_MS,
};
use crate::serializer::Format;

/// Root configuration for kiroku, deserialized from `config.toml`.
///
/// Every field has a serde default so kiroku runs without a config file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Vendor directory of the current settings location.
    #[serde(default = "default_vendor")]
    pub vendor: String,
    /// Product directory of the current settings location.
    #[serde(default = "default_product")]
    pub product: String,
    /// On-disk format of the settings document.
    #[serde(default)]
    pub format: Format,
    /// Settings filename. Defaults to `settings.<format extension>`.
    #[serde(default)]
    pub filename: Option<String>,
    /// Storage root replacing the platform local data directory.
    /// Supports `{env:VAR}` placeholders.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// Debounce interval for file-change notifications, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Pre-rebrand identity, read once for migration.
    #[serde(default)]
    pub legacy: LegacyConfig,
}

/// Vendor and product names the application used before its rebrand.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LegacyConfig {
    #[serde(default = "default_original_vendor")]
    pub vendor: String,
    #[serde(default = "default_original_product")]
    pub product: String,
}

fn default_vendor() -> String {
    DEFAULT_VENDOR.to_string()
}

fn default_product() -> String {
    DEFAULT_PRODUCT.to_string()
}

fn default_original_vendor() -> String {
    DEFAULT_ORIGINAL_VENDOR.to_string()
}

fn default_original_product() -> String {
    DEFAULT_ORIGINAL_PRODUCT.to_string()
}

fn default_throttle_ms() -> u64 {
    FILE_CHANGE_THROTTLE_MS
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            vendor: default_original_vendor(),
            product: default_original_product(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            product: default_product(),
            format: Format::default(),
            filename: None,
            data_dir: None,
            throttle_ms: default_throttle_ms(),
            legacy: LegacyConfig::default(),
        }
    }
}
