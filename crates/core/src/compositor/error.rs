//! Error types for the compositor module.

use thiserror::Error;

/// Errors that can occur while compositing.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// The base template could not be decoded.
    #[error("Failed to decode base image: {0}")]
    DecodeBase(String),

    /// An overlay could not be decoded.
    #[error("Failed to decode overlay {index}: {reason}")]
    DecodeOverlay { index: usize, reason: String },

    /// The composite could not be re-encoded.
    #[error("Failed to encode {format}: {reason}")]
    Encode { format: String, reason: String },
}
