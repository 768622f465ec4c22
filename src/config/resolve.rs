//! Environment variable substitution and storage option resolution.

use std::path::PathBuf;
use std::time::Duration;

use super::types::Config;
use crate::constants::{DATA_DIR_ENV, SETTINGS_FILE_STEM};
use crate::paths::Root;
use crate::provider::local::StoreOptions;

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.vendor = Self::resolve_str(&self.vendor);
        self.product = Self::resolve_str(&self.product);
        if let Some(ref mut dir) = self.data_dir {
            *dir = Self::resolve_str(dir);
        }
        if let Some(ref mut name) = self.filename {
            *name = Self::resolve_str(name);
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    ///
    /// Substituted values are not scanned again.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        let mut from = 0;
        while let Some(offset) = result[from..].find("{env:") {
            let start = from + offset;
            if let Some(end) = result[start..].find('}') {
                let var_name = &result[start + 5..start + end];
                let value = std::env::var(var_name).unwrap_or_default();
                result = format!(
                    "{}{}{}",
                    &result[..start],
                    value,
                    &result[start + end + 1..]
                );
                from = start + value.len();
            } else {
                break;
            }
        }
        result
    }

    /// Settings filename, derived from the format when not configured.
    pub fn settings_filename(&self) -> String {
        match self.filename {
            Some(ref name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{}.{}", SETTINGS_FILE_STEM, self.format.extension()),
        }
    }

    /// Storage root: `data_dir` if set, then `KIROKU_DATA_DIR`, then the
    /// platform local data directory.
    pub fn data_root(&self) -> Root {
        let configured = self
            .data_dir
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| std::env::var(DATA_DIR_ENV).ok().filter(|d| !d.is_empty()));
        match configured {
            Some(dir) => Root::Dir(PathBuf::from(dir)),
            None => Root::Platform,
        }
    }

    /// Builds the provider options this config describes.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            root: self.data_root(),
            vendor: self.vendor.clone(),
            product: self.product.clone(),
            original_vendor: self.legacy.vendor.clone(),
            original_product: self.legacy.product.clone(),
            filename: self.settings_filename(),
            format: self.format,
            throttle: Duration::from_millis(self.throttle_ms),
        }
    }
}
