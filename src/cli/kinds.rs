//! Structured setting kinds the kiroku binary knows how to store.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use kiroku::{KnownTypes, SettingValue};

pub const SHORTCUT: &str = "shortcut";
pub const WINDOW_BOUNDS: &str = "window-bounds";

/// A keyboard shortcut such as `Ctrl+Alt+Left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    pub modifiers: Vec<String>,
    pub key: String,
}

/// Saved window placement in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Registry of every structured kind the binary reads and writes.
pub fn known_types() -> KnownTypes {
    KnownTypes::new()
        .register::<Shortcut>(SHORTCUT)
        .register::<WindowBounds>(WINDOW_BOUNDS)
}

/// Parses `Ctrl+Alt+Left` into a shortcut value.
pub fn parse_shortcut(raw: &str) -> Result<SettingValue> {
    let mut parts: Vec<String> = raw
        .split('+')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let Some(key) = parts.pop() else {
        bail!("Empty shortcut. Expected something like Ctrl+Alt+Left");
    };
    let modifiers = parts.into_iter().map(|m| m.to_lowercase()).collect();
    Ok(SettingValue::custom(SHORTCUT, &Shortcut { modifiers, key })?)
}

/// Parses `x,y,width,height` into a window-bounds value.
pub fn parse_bounds(raw: &str) -> Result<SettingValue> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [x, y, width, height] = fields.as_slice() else {
        bail!("Expected window bounds as x,y,width,height, got '{}'", raw);
    };
    let bounds = WindowBounds {
        x: x.parse().with_context(|| format!("Invalid x '{}'", x))?,
        y: y.parse().with_context(|| format!("Invalid y '{}'", y))?,
        width: width.parse().with_context(|| format!("Invalid width '{}'", width))?,
        height: height.parse().with_context(|| format!("Invalid height '{}'", height))?,
    };
    Ok(SettingValue::custom(WINDOW_BOUNDS, &bounds)?)
}
