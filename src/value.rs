//! Dynamically-typed setting values and the registry of permitted types.
//!
//! A [`SettingsMap`] maps string keys to [`SettingValue`]s. Primitive values
//! and lists are always allowed; structured values are carried as
//! [`SettingValue::Custom`] and must name a kind registered in
//! [`KnownTypes`], whose data must deserialize as the registered Rust type.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};

/// The whole settings set, keyed by setting name.
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// A single setting value.
///
/// Serialized adjacently tagged (`type` / `value`) so an integer and a float
/// with the same numeric value stay distinct across a save/load cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    #[serde(rename = "string")]
    Text(String),
    List(Vec<SettingValue>),
    /// A structured value of a registered kind.
    Custom {
        kind: String,
        data: serde_json::Value,
    },
}

impl SettingValue {
    /// Wraps a serializable value as a structured setting of `kind`.
    pub fn custom<T: Serialize>(kind: impl Into<String>, value: &T) -> serde_json::Result<Self> {
        Ok(Self::Custom {
            kind: kind.into(),
            data: serde_json::to_value(value)?,
        })
    }

    /// Parses a command-line literal: booleans, integers and finite floats
    /// are recognised, everything else is text.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Int(n);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::Float(f),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Short type label, or the registered kind for structured values.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
            Self::List(_) => "list",
            Self::Custom { kind, .. } => kind,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a float; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SettingValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Decodes a structured value of the given kind into `T`.
    pub fn decode_custom<T: DeserializeOwned>(&self, expected_kind: &str) -> Option<T> {
        match self {
            Self::Custom { kind, data } if kind == expected_kind => T::deserialize(data).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Custom { data, .. } => write!(f, "{}", data),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for SettingValue {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<f64> for SettingValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<SettingValue>> for SettingValue {
    fn from(items: Vec<SettingValue>) -> Self {
        Self::List(items)
    }
}

type Validator = fn(&serde_json::Value) -> serde_json::Result<()>;

fn validate_as<T: DeserializeOwned>(data: &serde_json::Value) -> serde_json::Result<()> {
    T::deserialize(data).map(|_| ())
}

/// Allow-list of structured value kinds a provider may materialize.
///
/// Built once by the provider's owner and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct KnownTypes {
    validators: BTreeMap<String, Validator>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permits structured values of `kind` whose data deserializes as `T`.
    pub fn register<T: DeserializeOwned>(mut self, kind: impl Into<String>) -> Self {
        self.validators.insert(kind.into(), validate_as::<T>);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.validators.contains_key(kind)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    /// Checks one value, recursing into lists. Floats must be finite.
    pub fn check(&self, key: &str, value: &SettingValue) -> Result<()> {
        match value {
            SettingValue::Float(x) if !x.is_finite() => Err(SettingsError::NonFiniteFloat {
                key: key.to_string(),
            }),
            SettingValue::List(items) => items.iter().try_for_each(|item| self.check(key, item)),
            SettingValue::Custom { kind, data } => {
                let validate = self
                    .validators
                    .get(kind)
                    .ok_or_else(|| SettingsError::UnknownType {
                        key: key.to_string(),
                        kind: kind.clone(),
                    })?;
                validate(data).map_err(|source| SettingsError::TypeMismatch {
                    key: key.to_string(),
                    kind: kind.clone(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    /// Checks every value in the map.
    pub fn validate(&self, map: &SettingsMap) -> Result<()> {
        map.iter().try_for_each(|(key, value)| self.check(key, value))
    }
}

impl fmt::Debug for KnownTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}
