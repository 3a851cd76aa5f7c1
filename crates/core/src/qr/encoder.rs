//! QR encoder implementation.

use image::{ImageFormat, RgbaImage};
use qrcode::types::QrError as MatrixError;
use qrcode::{Color as Module, EcLevel, QrCode};
use std::fmt::Write as _;
use std::io::Cursor;

use super::error::QrError;
use super::types::QrStyle;

/// Encodes payloads into QR code images.
#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    ec_level: EcLevel,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::M,
        }
    }
}

/// A module matrix with its quiet zone applied.
struct Matrix {
    code: QrCode,
    margin: u32,
}

impl Matrix {
    /// Modules per side, quiet zone included.
    fn span(&self) -> u32 {
        self.code.width() as u32 + 2 * self.margin
    }

    /// Whether the module at (x, y) in quiet-zone coordinates is dark.
    fn is_dark(&self, x: u32, y: u32) -> bool {
        let width = self.code.width() as u32;
        let (Some(cx), Some(cy)) = (x.checked_sub(self.margin), y.checked_sub(self.margin)) else {
            return false;
        };
        if cx >= width || cy >= width {
            return false;
        }
        self.code[(cx as usize, cy as usize)] == Module::Dark
    }
}

impl QrEncoder {
    /// Creates an encoder with the given error correction level.
    pub fn new(ec_level: EcLevel) -> Self {
        Self { ec_level }
    }

    fn matrix(&self, payload: &str, margin: u32) -> Result<Matrix, QrError> {
        if payload.is_empty() {
            return Err(QrError::EmptyPayload);
        }

        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level)
            .map_err(|e| match e {
                MatrixError::DataTooLong => QrError::DataTooLong { len: payload.len() },
                other => QrError::Encode(other.to_string()),
            })?;

        Ok(Matrix { code, margin })
    }

    /// Renders the code as an RGBA raster of exactly `style.size` pixels per side.
    ///
    /// Modules are mapped to pixels by integer division, so module edges may
    /// differ by one pixel when the size is not a multiple of the module count.
    pub fn render(&self, payload: &str, style: &QrStyle) -> Result<RgbaImage, QrError> {
        let matrix = self.matrix(payload, style.margin)?;
        let span = matrix.span();
        if style.size < span {
            return Err(QrError::SizeTooSmall {
                size: style.size,
                modules: span,
            });
        }

        let dark = style.dark.to_rgba();
        let light = style.light.to_rgba();
        let size = u64::from(style.size);
        let span = u64::from(span);

        // Precompute the pixel -> module mapping for one axis.
        let modules: Vec<u32> = (0..size).map(|px| (px * span / size) as u32).collect();

        let image = RgbaImage::from_fn(style.size, style.size, |x, y| {
            if matrix.is_dark(modules[x as usize], modules[y as usize]) {
                dark
            } else {
                light
            }
        });

        Ok(image)
    }

    /// Encodes the code as PNG bytes.
    pub fn encode(&self, payload: &str, style: &QrStyle) -> Result<Vec<u8>, QrError> {
        let image = self.render(payload, style)?;
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| QrError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }

    /// Encodes the code as an SVG document with the same geometry as [`render`](Self::render).
    pub fn encode_svg(&self, payload: &str, style: &QrStyle) -> Result<String, QrError> {
        let matrix = self.matrix(payload, style.margin)?;
        let span = matrix.span();
        if style.size < span {
            return Err(QrError::SizeTooSmall {
                size: style.size,
                modules: span,
            });
        }

        let mut path = String::new();
        for y in 0..span {
            for x in 0..span {
                if matrix.is_dark(x, y) {
                    // Writing to a String cannot fail.
                    let _ = write!(path, "M{x} {y}h1v1h-1z");
                }
            }
        }

        Ok(format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" "#,
                r#"viewBox="0 0 {span} {span}" shape-rendering="crispEdges">"#,
                r#"<rect width="{span}" height="{span}" fill="{light}"/>"#,
                r#"<path d="{path}" fill="{dark}"/></svg>"#
            ),
            size = style.size,
            span = span,
            light = style.light,
            dark = style.dark,
            path = path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::Color;

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = QrEncoder::default();
        let style = QrStyle::new(200);
        let first = encoder.encode("TICKET-0001", &style).unwrap();
        let second = encoder.encode("TICKET-0001", &style).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_different_payloads_differ() {
        let encoder = QrEncoder::default();
        let style = QrStyle::new(200);
        let a = encoder.encode("TICKET-0001", &style).unwrap();
        let b = encoder.encode("TICKET-0002", &style).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_render_exact_size() {
        let encoder = QrEncoder::default();
        let image = encoder.render("hello", &QrStyle::new(333)).unwrap();
        assert_eq!(image.dimensions(), (333, 333));
    }

    #[test]
    fn test_margin_uses_light_color() {
        let encoder = QrEncoder::default();
        let style = QrStyle::new(290)
            .with_margin(4)
            .with_colors(Color::RED, Color::GREEN);
        let image = encoder.render("hello", &style).unwrap();

        // Corners sit in the quiet zone.
        assert_eq!(*image.get_pixel(0, 0), Color::GREEN.to_rgba());
        assert_eq!(*image.get_pixel(289, 289), Color::GREEN.to_rgba());
        // Some pixel must be dark.
        assert!(image.pixels().any(|p| *p == Color::RED.to_rgba()));
    }

    #[test]
    fn test_finder_pattern_is_dark_without_margin() {
        let encoder = QrEncoder::default();
        let image = encoder
            .render("hello", &QrStyle::new(210).with_margin(0))
            .unwrap();
        assert_eq!(*image.get_pixel(0, 0), Color::BLACK.to_rgba());
    }

    #[test]
    fn test_empty_payload_fails() {
        let encoder = QrEncoder::default();
        let result = encoder.encode("", &QrStyle::new(100));
        assert!(matches!(result, Err(QrError::EmptyPayload)));
    }

    #[test]
    fn test_payload_too_long_fails() {
        let encoder = QrEncoder::default();
        let payload = "x".repeat(5000);
        let result = encoder.encode(&payload, &QrStyle::new(1000));
        assert!(matches!(result, Err(QrError::DataTooLong { len: 5000 })));
    }

    #[test]
    fn test_size_too_small_fails() {
        let encoder = QrEncoder::default();
        let result = encoder.encode("hello", &QrStyle::new(10));
        assert!(matches!(result, Err(QrError::SizeTooSmall { size: 10, .. })));
    }

    #[test]
    fn test_svg_size_too_small_fails() {
        let encoder = QrEncoder::default();
        for size in [0, 10] {
            let result = encoder.encode_svg("hello", &QrStyle::new(size));
            assert!(matches!(result, Err(QrError::SizeTooSmall { size: s, .. }) if s == size));
        }
    }

    #[test]
    fn test_svg_output() {
        let encoder = QrEncoder::default();
        let style = QrStyle::new(400).with_colors(Color::BLACK, Color::WHITE);
        let svg = encoder.encode_svg("hello", &style).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="400""#));
        assert!(svg.contains(r##"fill="#FFFFFF""##));
        assert!(svg.contains(r##"fill="#000000""##));
        assert_eq!(svg, encoder.encode_svg("hello", &style).unwrap());
    }
}
