//! Live configuration: grid size and the style given to new shapes.

use crate::shapes::{
    DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, SerializableColor, ShapeStyle,
};
use crate::snap::GRID_SIZE;
use serde::{Deserialize, Serialize};

/// Source of configuration values, polled every time one is needed.
///
/// Implementations never fail: unreadable values fall back to defaults.
pub trait ConfigSource {
    /// Grid spacing in pixels, always positive.
    fn grid_size(&self) -> f64;

    fn fill_color(&self) -> SerializableColor;

    fn stroke_color(&self) -> SerializableColor;

    /// Outline width in pixels, always positive.
    fn stroke_width(&self) -> f64;

    /// Style snapshot for a shape created now.
    fn style(&self) -> ShapeStyle {
        ShapeStyle::new(self.fill_color(), self.stroke_color(), self.stroke_width())
    }
}

fn positive_or(value: f64, default: f64, what: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        log::warn!("Invalid {what} {value}, using {default}");
        default
    }
}

/// Typed settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_size: f64,
    pub fill_color: SerializableColor,
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            fill_color: DEFAULT_FILL,
            stroke_color: DEFAULT_STROKE,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl ConfigSource for Settings {
    fn grid_size(&self) -> f64 {
        positive_or(self.grid_size, GRID_SIZE, "grid size")
    }

    fn fill_color(&self) -> SerializableColor {
        self.fill_color
    }

    fn stroke_color(&self) -> SerializableColor {
        self.stroke_color
    }

    fn stroke_width(&self) -> f64 {
        positive_or(self.stroke_width, DEFAULT_STROKE_WIDTH, "stroke width")
    }
}

/// Raw form control values, parsed on every read.
///
/// Numbers are parsed like an integer input field; anything unparseable or not
/// positive reads as the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub grid_size: String,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE.to_string(),
            fill_color: DEFAULT_FILL.to_hex(),
            stroke_color: DEFAULT_STROKE.to_hex(),
            stroke_width: DEFAULT_STROKE_WIDTH.to_string(),
        }
    }
}

/// Leading integer of a form value, ignoring any trailing text.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}

fn parse_positive(raw: &str, default: f64, what: &str) -> f64 {
    match parse_leading_int(raw) {
        Some(value) if value > 0 => value as f64,
        _ => {
            log::warn!("Invalid {what} {raw:?}, using {default}");
            default
        }
    }
}

fn parse_color(raw: &str, default: SerializableColor, what: &str) -> SerializableColor {
    raw.parse().unwrap_or_else(|err| {
        log::warn!("Invalid {what}: {err}, using {default}");
        default
    })
}

impl ConfigSource for FormValues {
    fn grid_size(&self) -> f64 {
        parse_positive(&self.grid_size, GRID_SIZE, "grid size")
    }

    fn fill_color(&self) -> SerializableColor {
        parse_color(&self.fill_color, DEFAULT_FILL, "fill color")
    }

    fn stroke_color(&self) -> SerializableColor {
        parse_color(&self.stroke_color, DEFAULT_STROKE, "stroke color")
    }

    fn stroke_width(&self) -> f64 {
        parse_positive(&self.stroke_width, DEFAULT_STROKE_WIDTH, "stroke width")
    }
}
