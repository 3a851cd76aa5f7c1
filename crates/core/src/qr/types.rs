//! Types for the QR module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::QrError;

/// An opaque RGB colour, written as `#RRGGBB` (or `#RGB`) in configs and requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the colour as an opaque RGBA pixel.
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }

    /// Returns the colour as an RGBA pixel with the given opacity (0.0-1.0).
    pub fn with_opacity(self, opacity: f32) -> image::Rgba<u8> {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

impl FromStr for Color {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| QrError::InvalidColor(s.to_string()))?;

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| QrError::InvalidColor(s.to_string()))
        };

        match hex.len() {
            6 if hex.is_ascii() => Ok(Color::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 if hex.is_ascii() => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Color::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(QrError::InvalidColor(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = QrError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Geometry and palette of a rendered code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Edge length of the output in pixels (quiet zone included).
    pub size: u32,
    /// Quiet zone in modules.
    pub margin: u32,
    pub dark: Color,
    pub light: Color,
}

impl QrStyle {
    /// Black on white with a one-module margin.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            margin: 1,
            dark: Color::BLACK,
            light: Color::WHITE,
        }
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_colors(mut self, dark: Color, light: Color) -> Self {
        self.dark = dark;
        self.light = light;
        self
    }
}
