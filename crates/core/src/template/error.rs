//! Template error types.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template file with this id.
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Id would escape the template directory or is blank.
    #[error("Invalid template id: {0:?}")]
    InvalidId(String),

    /// Template exists but could not be read.
    #[error("Failed to read template {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },

    /// Template bytes are not a decodable image.
    #[error("Template {id} is not a valid image: {reason}")]
    Decode { id: String, reason: String },
}

impl TemplateError {
    /// Classifies an I/O failure for `id`.
    pub fn from_io(id: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(id.to_string())
        } else {
            Self::Io {
                id: id.to_string(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
