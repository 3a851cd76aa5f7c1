//! QR code encoding.
//!
//! Turns an opaque payload into a square code image at an exact pixel size,
//! with a configurable quiet zone and two-colour palette. Output is
//! deterministic: identical inputs always produce identical bytes.
//!
//! # Example
//!
//! ```ignore
//! use ticketpress_core::qr::{QrEncoder, QrStyle, Color};
//!
//! let encoder = QrEncoder::default();
//! let style = QrStyle::new(600).with_margin(1);
//! let png = encoder.encode("TICKET-0001", &style)?;
//! let svg = encoder.encode_svg("TICKET-0001", &style)?;
//! ```

mod encoder;
mod error;
mod types;

pub use encoder::QrEncoder;
pub use error::QrError;
pub use types::{Color, QrStyle};
