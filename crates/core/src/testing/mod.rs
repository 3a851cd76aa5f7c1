//! Testing utilities and mock implementations.
//!
//! Shared by unit tests, the core integration tests and the server tests, so
//! batches can be driven without real templates and progress expiry can be
//! tested without waiting.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketpress_core::testing::{fixtures, ManualClock, MockRenderer};
//!
//! let renderer = MockRenderer::new().fail_with(2, "boom");
//! let clock = Arc::new(ManualClock::new());
//! let store = ProgressStore::with_clock(ProgressConfig::default(), clock.clone());
//!
//! clock.advance(chrono::Duration::minutes(6));
//! ```

mod manual_clock;
mod mock_renderer;

pub use manual_clock::ManualClock;
pub use mock_renderer::MockRenderer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::io::{Cursor, Read};
    use std::path::Path;

    use crate::render::TicketDescriptor;

    /// `count` tickets numbered from 1 with payloads `TICKET-0001`, ...
    pub fn tickets(count: usize) -> Vec<TicketDescriptor> {
        (1..=count as u64)
            .map(|seq| TicketDescriptor::new(format!("TICKET-{:04}", seq), seq))
            .collect()
    }

    /// A plain white PNG.
    pub fn template_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)
            .expect("encoding an in-memory PNG cannot fail");
        buffer.into_inner()
    }

    /// Writes a white PNG template into `dir`. The file name may carry any
    /// extension; decoding sniffs the content.
    pub fn write_template(dir: &Path, name: &str, width: u32, height: u32) {
        std::fs::write(dir.join(name), template_png(width, height))
            .expect("failed to write template fixture");
    }

    /// Entry names of a zip archive, in archive order.
    pub fn archive_names(bytes: &[u8]) -> Vec<String> {
        let zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("invalid zip archive");
        zip.file_names().map(str::to_string).collect()
    }

    /// Entries of a zip archive keyed by name.
    pub fn archive_entries(bytes: &[u8]) -> HashMap<String, Vec<u8>> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).expect("invalid zip archive");
        let mut entries = HashMap::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).expect("unreadable zip entry");
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .expect("unreadable zip entry content");
            entries.insert(file.name().to_string(), content);
        }
        entries
    }
}
