//! Configuration types and path resolution for kiroku.
//!
//! The configuration only says *where* settings live and in which format:
//! vendor/product directories, the pre-rebrand identity to migrate from, and
//! an optional storage root. It is read as TOML from the platform's XDG
//! config path (e.g. `~/.config/kiroku/config.toml` on Linux).

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::Config;
pub use types::LegacyConfig;

use anyhow::Result;
use std::path::Path;

impl Config {
    /// Load config from `explicit` if given, else the global config file,
    /// falling back to defaults when neither exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => Self::load_global()?,
        };
        config.resolve_substitutions();
        Ok(config)
    }

    /// Parse config text, applying `{env:VAR}` substitution.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        config.resolve_substitutions();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::Root;
    use crate::serializer::Format;
    use std::path::PathBuf;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.vendor, crate::constants::DEFAULT_VENDOR);
        assert_eq!(config.legacy.product, crate::constants::DEFAULT_ORIGINAL_PRODUCT);
        assert_eq!(config.format, Format::Json);
        assert_eq!(config.settings_filename(), "settings.json");
        assert_eq!(config.throttle_ms, 1500);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
vendor = "Acme"
product = "Desk"
format = "toml"
throttle_ms = 250
data_dir = "/srv/settings"

[legacy]
vendor = "OldAcme"
product = "OldDesk"
"#,
        )
        .unwrap();
        let options = config.store_options();
        assert_eq!(options.root, Root::Dir(PathBuf::from("/srv/settings")));
        assert_eq!(options.filename, "settings.toml");
        assert_eq!(options.original_vendor, "OldAcme");
        assert_eq!(options.original_product, "OldDesk");
        assert_eq!(options.throttle.as_millis(), 250);
    }

    #[test]
    fn test_env_placeholder_in_data_dir() {
        std::env::set_var("KIROKU_TEST_ROOT_SUBST", "/tmp/kiroku-subst");
        let config = Config::from_toml(r#"data_dir = "{env:KIROKU_TEST_ROOT_SUBST}/store""#).unwrap();
        assert_eq!(config.data_dir.as_deref(), Some("/tmp/kiroku-subst/store"));
    }

    #[test]
    fn test_self_referencing_env_value_is_not_expanded_again() {
        std::env::set_var("KIROKU_TEST_SELF_REF", "{env:KIROKU_TEST_SELF_REF}-x");
        let config = Config::from_toml(
            r#"vendor = "a-{env:KIROKU_TEST_SELF_REF}-{env:KIROKU_TEST_UNSET_SUBST}b""#,
        )
        .unwrap();
        assert_eq!(config.vendor, "a-{env:KIROKU_TEST_SELF_REF}-x-b");
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Config::from_toml(r#"format = "xml""#).is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(Config::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }
}
