//! Batch error types.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::progress::ProgressError;

/// Batch-level failures. Per-ticket failures never appear here.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Input rejected before any work started.
    #[error("{0}")]
    Validation(String),

    /// The default template could not be found; no wave was started.
    #[error("Default template not found: {0}")]
    DefaultTemplateMissing(String),

    /// Another batch already reports progress under this session id.
    #[error("Session already in use: {0}")]
    SessionInUse(String),

    /// The archive could not be written or finalized.
    #[error("Archive failed: {0}")]
    Archive(#[from] ArchiveError),

    /// Cancelled at a wave boundary.
    #[error("Batch cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BatchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            BatchError::Validation(_) => "validation",
            BatchError::DefaultTemplateMissing(_) => "template_missing",
            BatchError::SessionInUse(_) => "session_in_use",
            BatchError::Archive(_) => "archive",
            BatchError::Cancelled => "cancelled",
            BatchError::Internal(_) => "internal",
        }
    }
}

impl From<ProgressError> for BatchError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::SessionExists(id) => Self::SessionInUse(id),
            other => Self::Validation(other.to_string()),
        }
    }
}
