//! Error types for the QR module.

use thiserror::Error;

/// Errors that can occur while encoding a QR code.
#[derive(Debug, Error)]
pub enum QrError {
    /// Nothing to encode.
    #[error("QR payload is empty")]
    EmptyPayload,

    /// Payload exceeds the capacity of the largest QR version.
    #[error("QR payload too long ({len} bytes)")]
    DataTooLong { len: usize },

    /// Requested pixel size cannot fit one pixel per module.
    #[error("QR size {size}px is smaller than the {modules} modules it must hold")]
    SizeTooSmall { size: u32, modules: u32 },

    /// Colour string could not be parsed.
    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    /// The matrix could not be built or the image could not be written.
    #[error("QR encoding failed: {0}")]
    Encode(String),
}
