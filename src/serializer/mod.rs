//! Codecs that turn a [`SettingsMap`] into bytes and back.
//!
//! Every codec implements [`Serializer`]. Decoding is always restricted to a
//! [`KnownTypes`] registry: structural parsing happens in
//! [`Serializer::parse`], and [`Serializer::decode`] rejects anything the
//! registry does not permit.

mod json;
mod toml;

pub use self::json::JsonSerializer;
pub use self::toml::TomlSerializer;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::{KnownTypes, SettingsMap};

/// Encodes and decodes a whole settings document.
pub trait Serializer: Send + Sync {
    /// The format this codec reads and writes.
    fn format(&self) -> Format;

    /// Encodes the full map as a self-describing document.
    fn encode(&self, map: &SettingsMap) -> Result<Vec<u8>>;

    /// Parses a document without consulting the type registry.
    fn parse(&self, bytes: &[u8]) -> Result<SettingsMap>;

    /// Parses a document and rejects values the registry does not permit.
    fn decode(&self, bytes: &[u8], known: &KnownTypes) -> Result<SettingsMap> {
        let map = self.parse(bytes)?;
        known.validate(&map)?;
        Ok(map)
    }
}

/// On-disk settings formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl Format {
    /// File extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Returns a shareable codec for this format.
    pub fn serializer(self) -> Arc<dyn Serializer> {
        match self {
            Format::Json => Arc::new(JsonSerializer),
            Format::Toml => Arc::new(TomlSerializer),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Toml => write!(f, "TOML"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            other => Err(format!("unsupported settings format '{}'", other)),
        }
    }
}
