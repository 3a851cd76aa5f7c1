//! Zip archive assembly.
//!
//! [`ArchiveWriter`] accepts named buffers from concurrent producers and
//! serializes them into one deflate-compressed zip held in memory. Entry
//! names must be unique; the writer rejects a repeated name instead of
//! renaming it.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketpress_core::archive::{ArchiveEntry, ArchiveWriter};
//!
//! let writer = ArchiveWriter::open(6);
//! writer.append(ArchiveEntry::new("An_1.jpg", jpeg_bytes))?;
//! let zip_bytes = writer.finalize()?;
//! ```

mod error;
mod writer;

pub use error::ArchiveError;
pub use writer::{ArchiveEntry, ArchiveWriter};
