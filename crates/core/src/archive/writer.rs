//! In-memory zip writer shared between wave tasks.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Mutex;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ArchiveError;

/// A named buffer destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

struct OpenArchive {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

/// Accumulates entries into a zip. Safe to share across threads.
pub struct ArchiveWriter {
    options: SimpleFileOptions,
    inner: Mutex<Option<OpenArchive>>,
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("entries", &self.len())
            .finish()
    }
}

impl ArchiveWriter {
    /// Opens an empty archive. `compression_level` is the deflate level, 0-9.
    pub fn open(compression_level: u8) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(compression_level.min(9))));

        Self {
            options,
            inner: Mutex::new(Some(OpenArchive {
                zip: ZipWriter::new(Cursor::new(Vec::new())),
                names: HashSet::new(),
            })),
        }
    }

    /// Writes one entry. Concurrent callers are serialized.
    pub fn append(&self, entry: ArchiveEntry) -> Result<(), ArchiveError> {
        let mut guard = self.inner.lock().map_err(|_| ArchiveError::Poisoned)?;
        let archive = guard.as_mut().ok_or(ArchiveError::Closed)?;

        if archive.names.contains(&entry.name) {
            return Err(ArchiveError::DuplicateEntry(entry.name));
        }

        archive.zip.start_file(entry.name.as_str(), self.options)?;
        archive.zip.write_all(&entry.content)?;
        debug!(entry = %entry.name, size = entry.content.len(), "Archive entry written");
        archive.names.insert(entry.name);
        Ok(())
    }

    /// Number of entries written so far; zero once finalized.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .ok()
            .and_then(|g| g.as_ref().map(|a| a.names.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the central directory and returns the archive bytes.
    ///
    /// Only the first call succeeds; later calls, and any append after it,
    /// fail with [`ArchiveError::Closed`].
    pub fn finalize(&self) -> Result<Vec<u8>, ArchiveError> {
        let archive = self
            .inner
            .lock()
            .map_err(|_| ArchiveError::Poisoned)?
            .take()
            .ok_or(ArchiveError::Closed)?;

        let entries = archive.names.len();
        let bytes = archive.zip.finish()?.into_inner();
        debug!(entries, size = bytes.len(), "Archive finalized");
        Ok(bytes)
    }
}
