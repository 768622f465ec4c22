use serde_json::Value;

use super::{Format, Serializer};
use crate::error::{Result, SettingsError};
use crate::value::{SettingValue, SettingsMap};

/// TOML documents, one table per setting.
///
/// TOML has no null. Null object fields in structured values are left out
/// of the document, which reads back as `None` for optional fields; a null
/// anywhere else cannot be encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSerializer;

impl Serializer for TomlSerializer {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn encode(&self, map: &SettingsMap) -> Result<Vec<u8>> {
        let encodable = map
            .iter()
            .map(|(key, value)| Ok((key.clone(), without_nulls(key, value)?)))
            .collect::<Result<SettingsMap>>()?;
        toml::to_string_pretty(&encodable)
            .map(String::into_bytes)
            .map_err(|e| malformed(e.to_string()))
    }

    fn parse(&self, bytes: &[u8]) -> Result<SettingsMap> {
        let text = std::str::from_utf8(bytes).map_err(|e| malformed(e.to_string()))?;
        toml::from_str(text).map_err(|e| malformed(e.to_string()))
    }
}

fn without_nulls(key: &str, value: &SettingValue) -> Result<SettingValue> {
    match value {
        SettingValue::List(items) => items
            .iter()
            .map(|item| without_nulls(key, item))
            .collect::<Result<Vec<_>>>()
            .map(SettingValue::List),
        SettingValue::Custom { kind, data } => Ok(SettingValue::Custom {
            kind: kind.clone(),
            data: strip_nulls(key, data)?,
        }),
        other => Ok(other.clone()),
    }
}

fn strip_nulls(key: &str, data: &Value) -> Result<Value> {
    match data {
        Value::Null => Err(malformed(format!(
            "setting '{}' contains a null value outside an object field",
            key
        ))),
        Value::Object(fields) => fields
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| Ok((k.clone(), strip_nulls(key, v)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        Value::Array(items) => items
            .iter()
            .map(|v| strip_nulls(key, v))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn malformed(message: String) -> SettingsError {
    SettingsError::Serialization {
        format: Format::Toml,
        message,
    }
}
