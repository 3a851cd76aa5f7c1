//! Archive error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive has already been finalized.
    #[error("Archive is closed")]
    Closed,

    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer thread panicked while holding the archive.
    #[error("Archive lock poisoned")]
    Poisoned,
}
