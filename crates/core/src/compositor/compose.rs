//! Compositor implementation.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::{debug, warn};

use super::error::CompositionError;
use super::types::{OutputFormat, Overlay};

/// Paints overlays onto a base image and re-encodes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor {
    /// Overhang in pixels tolerated without a warning.
    tolerance: u32,
}

/// Whether any pixel of an `overlay`-sized box at (x, y) lands on the canvas.
fn intersects(canvas: (u32, u32), overlay: (u32, u32), x: i64, y: i64) -> bool {
    x < i64::from(canvas.0)
        && y < i64::from(canvas.1)
        && x.saturating_add(i64::from(overlay.0)) > 0
        && y.saturating_add(i64::from(overlay.1)) > 0
}

/// Largest distance, in pixels, by which a box of `overlay` size placed at
/// (x, y) extends past a `canvas`-sized area on any side.
pub fn overhang(canvas: (u32, u32), overlay: (u32, u32), x: i64, y: i64) -> u64 {
    let (cw, ch) = (i64::from(canvas.0), i64::from(canvas.1));
    let (ow, oh) = (i64::from(overlay.0), i64::from(overlay.1));

    let left = x.saturating_neg();
    let top = y.saturating_neg();
    let right = x.saturating_add(ow).saturating_sub(cw);
    let bottom = y.saturating_add(oh).saturating_sub(ch);

    [left, top, right, bottom].into_iter().max().unwrap_or(0).max(0) as u64
}

impl Compositor {
    pub fn new(tolerance: u32) -> Self {
        Self { tolerance }
    }

    /// Decodes `base`, paints `overlays` in order and encodes the result.
    ///
    /// `quality` is clamped to 1-100 and only affects JPEG output.
    pub fn compose(
        &self,
        base: &[u8],
        overlays: &[Overlay],
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, CompositionError> {
        let canvas = image::load_from_memory(base)
            .map_err(|e| CompositionError::DecodeBase(e.to_string()))?
            .to_rgba8();
        let canvas = self.paint(canvas, overlays)?;
        encode(canvas, format, quality)
    }

    /// Paints `overlays` onto an already decoded canvas.
    ///
    /// Pixels falling outside the canvas are dropped.
    pub fn paint(
        &self,
        mut canvas: RgbaImage,
        overlays: &[Overlay],
    ) -> Result<RgbaImage, CompositionError> {
        for (index, overlay) in overlays.iter().enumerate() {
            let layer = overlay.image.decode(index)?;
            let excess = overhang(canvas.dimensions(), layer.dimensions(), overlay.x, overlay.y);

            if excess > u64::from(self.tolerance) {
                warn!(
                    index,
                    x = overlay.x,
                    y = overlay.y,
                    overlay_width = layer.width(),
                    overlay_height = layer.height(),
                    canvas_width = canvas.width(),
                    canvas_height = canvas.height(),
                    overhang = excess,
                    "Overlay exceeds canvas bounds, clipping"
                );
            }

            if intersects(canvas.dimensions(), layer.dimensions(), overlay.x, overlay.y) {
                imageops::overlay(&mut canvas, &*layer, overlay.x, overlay.y);
            }
        }

        debug!(overlays = overlays.len(), "Composite painted");
        Ok(canvas)
    }
}

/// Encodes a canvas in the requested format.
pub(crate) fn encode(
    canvas: RgbaImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, CompositionError> {
    let encode_err = |e: image::ImageError| CompositionError::Encode {
        format: format.to_string(),
        reason: e.to_string(),
    };

    let mut buffer = Cursor::new(Vec::new());
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(encode_err)?;
        }
        OutputFormat::Png => {
            canvas
                .write_to(&mut buffer, ImageFormat::Png)
                .map_err(encode_err)?;
        }
    }

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, color);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory(bytes).unwrap().to_rgba8()
    }

    #[test]
    fn test_overhang() {
        assert_eq!(overhang((100, 100), (10, 10), 0, 0), 0);
        assert_eq!(overhang((100, 100), (10, 10), 90, 90), 0);
        assert_eq!(overhang((100, 100), (10, 10), 95, 0), 5);
        assert_eq!(overhang((100, 100), (10, 10), 0, 97), 7);
        assert_eq!(overhang((100, 100), (10, 10), -3, 0), 3);
        assert_eq!(overhang((100, 100), (10, 10), 500, 0), 410);
    }

    #[test]
    fn test_overlay_painted_at_offset() {
        let compositor = Compositor::default();
        let base = png(50, 40, WHITE);
        let overlays = vec![Overlay::encoded(png(10, 10, RED), 5, 8)];

        let out = compositor
            .compose(&base, &overlays, OutputFormat::Png, 90)
            .unwrap();
        let img = decode(&out);

        assert_eq!(img.dimensions(), (50, 40));
        assert_eq!(*img.get_pixel(5, 8), RED);
        assert_eq!(*img.get_pixel(14, 17), RED);
        assert_eq!(*img.get_pixel(4, 8), WHITE);
        assert_eq!(*img.get_pixel(15, 17), WHITE);
    }

    #[test]
    fn test_later_overlays_occlude_earlier() {
        let compositor = Compositor::default();
        let base = png(30, 30, WHITE);
        let overlays = vec![
            Overlay::encoded(png(10, 10, RED), 0, 0),
            Overlay::raster(RgbaImage::from_pixel(5, 5, BLUE), 5, 5),
        ];

        let img = decode(
            &compositor
                .compose(&base, &overlays, OutputFormat::Png, 90)
                .unwrap(),
        );
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(7, 7), BLUE);
    }

    #[test]
    fn test_out_of_bounds_overlay_is_clipped() {
        let compositor = Compositor::default();
        let base = png(20, 20, WHITE);
        let overlays = vec![
            Overlay::encoded(png(10, 10, RED), 15, 15),
            Overlay::encoded(png(10, 10, BLUE), 100, 100),
        ];

        let img = decode(
            &compositor
                .compose(&base, &overlays, OutputFormat::Png, 90)
                .unwrap(),
        );
        assert_eq!(img.dimensions(), (20, 20));
        assert_eq!(*img.get_pixel(19, 19), RED);
        assert_eq!(*img.get_pixel(14, 14), WHITE);
    }

    #[test]
    fn test_negative_offset_is_clipped() {
        let compositor = Compositor::default();
        let base = png(20, 20, WHITE);
        let overlays = vec![Overlay::encoded(png(10, 10, RED), -5, -5)];

        let img = decode(
            &compositor
                .compose(&base, &overlays, OutputFormat::Png, 90)
                .unwrap(),
        );
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(4, 4), RED);
        assert_eq!(*img.get_pixel(5, 5), WHITE);
    }

    #[test]
    fn test_extreme_offsets_are_clipped() {
        assert_eq!(overhang((10, 10), (4, 4), i64::MAX, 0), i64::MAX as u64);
        assert_eq!(overhang((10, 10), (4, 4), 0, i64::MIN), i64::MAX as u64);

        let compositor = Compositor::default();
        let base = png(10, 10, WHITE);
        let overlays = vec![
            Overlay::raster(RgbaImage::from_pixel(4, 4, RED), i64::MAX, 0),
            Overlay::raster(RgbaImage::from_pixel(4, 4, RED), 0, i64::MIN),
            Overlay::raster(RgbaImage::from_pixel(4, 4, RED), i64::MIN, i64::MAX),
        ];

        let img = decode(
            &compositor
                .compose(&base, &overlays, OutputFormat::Png, 90)
                .unwrap(),
        );
        assert_eq!(img.dimensions(), (10, 10));
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_jpeg_output_and_quality_clamp() {
        let compositor = Compositor::default();
        let base = png(32, 32, WHITE);

        for quality in [0u8, 1, 50, 100, 255] {
            let out = compositor
                .compose(&base, &[], OutputFormat::Jpeg, quality)
                .unwrap();
            assert_eq!(&out[..2], &[0xFF, 0xD8]);
            assert_eq!(decode(&out).dimensions(), (32, 32));
        }
    }

    #[test]
    fn test_undecodable_base_fails() {
        let compositor = Compositor::default();
        let result = compositor.compose(b"not an image", &[], OutputFormat::Jpeg, 90);
        assert!(matches!(result, Err(CompositionError::DecodeBase(_))));
    }

    #[test]
    fn test_undecodable_overlay_fails() {
        let compositor = Compositor::default();
        let base = png(10, 10, WHITE);
        let overlays = vec![Overlay::encoded(b"garbage".to_vec(), 0, 0)];
        let result = compositor.compose(&base, &overlays, OutputFormat::Png, 90);
        assert!(matches!(
            result,
            Err(CompositionError::DecodeOverlay { index: 0, .. })
        ));
    }
}
