//! Colors and style properties shared by every shape kind.

use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a CSS hex color string cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("expected 3, 6 or 8 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in {0:?}")]
    InvalidDigit(String),
}

/// Serializable color representation (RGBA8).
///
/// Serialized as a CSS hex string so settings files and exported markup
/// carry the same text a color picker produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(s.to_string()));
        }

        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        let invalid = |_| ColorParseError::InvalidDigit(s.to_string());

        match digits.len() {
            3 => Ok(Self::rgb(
                nibble(0).map_err(invalid)? * 17,
                nibble(1).map_err(invalid)? * 17,
                nibble(2).map_err(invalid)? * 17,
            )),
            6 => Ok(Self::rgb(
                byte(0).map_err(invalid)?,
                byte(2).map_err(invalid)?,
                byte(4).map_err(invalid)?,
            )),
            8 => Ok(Self::new(
                byte(0).map_err(invalid)?,
                byte(2).map_err(invalid)?,
                byte(4).map_err(invalid)?,
                byte(6).map_err(invalid)?,
            )),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Default fill for closed shapes.
pub const DEFAULT_FILL: SerializableColor = SerializableColor::rgb(0x33, 0x33, 0x33);
/// Default outline and text color.
pub const DEFAULT_STROKE: SerializableColor = SerializableColor::white();
/// Default outline width in pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Style properties for shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Interior color of closed shapes.
    pub fill_color: SerializableColor,
    /// Outline color; also the color of text.
    pub stroke_color: SerializableColor,
    /// Outline width.
    pub stroke_width: f64,
}

impl ShapeStyle {
    pub fn new(fill_color: SerializableColor, stroke_color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            fill_color,
            stroke_color,
            stroke_width,
        }
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Color {
        self.fill_color.into()
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::new(DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH)
    }
}

/// A partial style update. Absent fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleEdit {
    pub fill_color: Option<SerializableColor>,
    pub stroke_color: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
}

impl StyleEdit {
    pub fn fill(color: SerializableColor) -> Self {
        Self {
            fill_color: Some(color),
            ..Self::default()
        }
    }

    pub fn stroke(color: SerializableColor) -> Self {
        Self {
            stroke_color: Some(color),
            ..Self::default()
        }
    }

    pub fn width(width: f64) -> Self {
        Self {
            stroke_width: Some(width),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fill_color.is_none() && self.stroke_color.is_none() && self.stroke_width.is_none()
    }

    /// Apply the present fields to `style`. Returns true if anything changed.
    ///
    /// Widths that are not positive and finite are ignored.
    pub fn apply(&self, style: &mut ShapeStyle) -> bool {
        let before = style.clone();
        if let Some(fill) = self.fill_color {
            style.fill_color = fill;
        }
        if let Some(stroke) = self.stroke_color {
            style.stroke_color = stroke;
        }
        match self.stroke_width {
            Some(width) if width.is_finite() && width > 0.0 => style.stroke_width = width,
            Some(width) => log::debug!("Ignoring stroke width {width}"),
            None => {}
        }
        *style != before
    }
}
