//! Render error types.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::compositor::CompositionError;
use crate::qr::QrError;
use crate::template::TemplateError;

/// Broad failure class, used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Encoding,
    Composition,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Composition => "composition",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    /// Bad input, rejected before any file access.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("QR encoding failed: {0}")]
    Encoding(#[from] QrError),

    #[error("Composition failed: {0}")]
    Composition(#[from] CompositionError),

    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Validation(_) => ErrorKind::Validation,
            RenderError::Template(TemplateError::NotFound(_)) => ErrorKind::NotFound,
            RenderError::Template(TemplateError::InvalidId(_)) => ErrorKind::Validation,
            RenderError::Template(_) => ErrorKind::Internal,
            RenderError::Encoding(QrError::InvalidColor(_) | QrError::SizeTooSmall { .. }) => {
                ErrorKind::Validation
            }
            RenderError::Encoding(_) => ErrorKind::Encoding,
            RenderError::Composition(_) => ErrorKind::Composition,
            RenderError::Timeout(_) | RenderError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            RenderError::validation("payload is required").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RenderError::from(TemplateError::NotFound("x.jpg".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RenderError::from(QrError::EmptyPayload).kind(),
            ErrorKind::Encoding
        );
        assert_eq!(
            RenderError::from(QrError::SizeTooSmall { size: 0, modules: 23 }).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RenderError::from(CompositionError::DecodeBase("bad".into())).kind(),
            ErrorKind::Composition
        );
        assert_eq!(
            RenderError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = RenderError::from(TemplateError::NotFound("ticket_KV.jpg".into()));
        assert_eq!(err.to_string(), "Template not found: ticket_KV.jpg");
    }
}
