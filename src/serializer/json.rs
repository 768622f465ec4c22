use super::{Format, Serializer};
use crate::error::{Result, SettingsError};
use crate::value::SettingsMap;

/// Pretty-printed JSON, the default on-disk format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(&self, map: &SettingsMap) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(map).map_err(malformed)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn parse(&self, bytes: &[u8]) -> Result<SettingsMap> {
        serde_json::from_slice(bytes).map_err(malformed)
    }
}

fn malformed(err: serde_json::Error) -> SettingsError {
    SettingsError::Serialization {
        format: Format::Json,
        message: err.to_string(),
    }
}
