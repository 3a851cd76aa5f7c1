//! Types for the compositor module.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::error::CompositionError;

/// Encoded output format of a composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// MIME type for HTTP responses.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            other => Err(format!("unsupported output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg => write!(f, "jpeg"),
            OutputFormat::Png => write!(f, "png"),
        }
    }
}

/// Pixels of an overlay, either still encoded or already rasterised.
#[derive(Debug, Clone)]
pub enum OverlayImage {
    /// Encoded bytes in any format the decoder understands.
    Encoded(Vec<u8>),
    /// A ready raster, skipping a decode round trip.
    Raster(RgbaImage),
}

impl OverlayImage {
    pub(crate) fn decode(&self, index: usize) -> Result<Cow<'_, RgbaImage>, CompositionError> {
        match self {
            OverlayImage::Raster(image) => Ok(Cow::Borrowed(image)),
            OverlayImage::Encoded(bytes) => image::load_from_memory(bytes)
                .map(|img| Cow::Owned(img.to_rgba8()))
                .map_err(|e| CompositionError::DecodeOverlay {
                    index,
                    reason: e.to_string(),
                }),
        }
    }
}

/// One layer painted onto the base, offset from its top-left corner.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub image: OverlayImage,
    pub x: i64,
    pub y: i64,
}

impl Overlay {
    pub fn encoded(bytes: Vec<u8>, x: i64, y: i64) -> Self {
        Self {
            image: OverlayImage::Encoded(bytes),
            x,
            y,
        }
    }

    pub fn raster(image: RgbaImage, x: i64, y: i64) -> Self {
        Self {
            image: OverlayImage::Raster(image),
            x,
            y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_serde_alias() {
        let format: OutputFormat = serde_json::from_str("\"jpg\"").unwrap();
        assert_eq!(format, OutputFormat::Jpeg);
        assert_eq!(serde_json::to_string(&OutputFormat::Png).unwrap(), "\"png\"");
    }

    #[test]
    fn test_output_format_metadata() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
    }
}
