//! Raster compositing of ticket images.
//!
//! The [`Compositor`] paints an ordered list of overlays onto a decoded base
//! template and re-encodes the result. Overlays that extend past the canvas
//! are clipped silently; a warning is logged when the overhang exceeds the
//! configured tolerance.
//!
//! [`counter_badge`] and [`circle_marker`] build the small decorations that
//! get painted alongside the QR code.

mod badge;
mod compose;
mod error;
mod types;

pub use badge::{circle_marker, counter_badge};
pub use compose::{overhang, Compositor};
pub use error::CompositionError;
pub use types::{OutputFormat, Overlay, OverlayImage};
