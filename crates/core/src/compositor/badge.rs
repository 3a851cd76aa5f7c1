//! Small raster decorations: the sequence counter and the calibration marker.

use image::{Rgba, RgbaImage};

use crate::qr::Color;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// Segment bits: a b c d e f g (top, upper right, lower right, bottom,
// lower left, upper left, middle).
const SEGMENTS: [u8; 10] = [
    0b111_1110, // 0
    0b011_0000, // 1
    0b110_1101, // 2
    0b111_1001, // 3
    0b011_0011, // 4
    0b101_1011, // 5
    0b101_1111, // 6
    0b111_0000, // 7
    0b111_1111, // 8
    0b111_1011, // 9
];

fn fill(image: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, pixel: Rgba<u8>) {
    for py in y..(y + h).min(image.height()) {
        for px in x..(x + w).min(image.width()) {
            image.put_pixel(px, py, pixel);
        }
    }
}

/// Renders `number` as seven-segment digits `digit_height` pixels tall on a
/// transparent background.
pub fn counter_badge(number: u64, digit_height: u32, color: Color, opacity: f32) -> RgbaImage {
    let digits: Vec<usize> = number
        .to_string()
        .bytes()
        .map(|b| usize::from(b - b'0'))
        .collect();

    let h = digit_height.max(5);
    let w = (h / 2).max(3);
    let t = (h / 10).max(1);
    let gap = t * 2;
    let mid = h / 2;

    let count = digits.len() as u32;
    let mut badge = RgbaImage::from_pixel(count * w + (count - 1) * gap, h, TRANSPARENT);
    let ink = color.with_opacity(opacity);

    for (i, digit) in digits.into_iter().enumerate() {
        let ox = i as u32 * (w + gap);
        let bits = SEGMENTS[digit];
        let on = |segment: u8| bits & (1 << (6 - segment)) != 0;

        if on(0) {
            fill(&mut badge, ox + t, 0, w - 2 * t, t, ink);
        }
        if on(1) {
            fill(&mut badge, ox + w - t, t, t, mid - t, ink);
        }
        if on(2) {
            fill(&mut badge, ox + w - t, mid, t, h - mid - t, ink);
        }
        if on(3) {
            fill(&mut badge, ox + t, h - t, w - 2 * t, t, ink);
        }
        if on(4) {
            fill(&mut badge, ox, mid, t, h - mid - t, ink);
        }
        if on(5) {
            fill(&mut badge, ox, t, t, mid - t, ink);
        }
        if on(6) {
            fill(&mut badge, ox + t, mid - t / 2, w - 2 * t, t, ink);
        }
    }

    badge
}

/// A filled circle of the given diameter on a transparent background.
pub fn circle_marker(diameter: u32, color: Color, opacity: f32) -> RgbaImage {
    let d = diameter.max(1);
    let r = f64::from(d) / 2.0;
    let ink = color.with_opacity(opacity);

    RgbaImage::from_fn(d, d, |x, y| {
        let dx = f64::from(x) + 0.5 - r;
        let dy = f64::from(y) + 0.5 - r;
        if dx * dx + dy * dy <= r * r {
            ink
        } else {
            TRANSPARENT
        }
    })
}
