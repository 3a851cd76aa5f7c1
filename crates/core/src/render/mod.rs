//! Per-ticket rendering.
//!
//! A [`Renderer`] turns one [`TicketDescriptor`] into encoded image bytes:
//! resolve the template for the ticket's zone, encode the QR payload, paint
//! the optional counter badge and the QR onto the template, re-encode.
//!
//! The trait is synchronous; callers that run on an async runtime move it onto
//! a blocking thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketpress_core::render::{Renderer, TicketDescriptor, TicketRenderer};
//!
//! let renderer = TicketRenderer::from_config(&config);
//! let ticket = TicketDescriptor::new("TICKET-0001", 1).with_zone("Khát Vọng");
//! let jpeg = renderer.render(&ticket, &config.ticket)?;
//! ```

mod error;
mod renderer;
mod types;

pub use error::{ErrorKind, RenderError};
pub use renderer::{TicketRenderer, POSITION_TEST_PAYLOAD};
pub use types::TicketDescriptor;

use crate::config::TicketConfig;

/// Renders tickets to image bytes.
pub trait Renderer: Send + Sync {
    /// Renders one ticket with `config`.
    fn render(&self, ticket: &TicketDescriptor, config: &TicketConfig)
        -> Result<Vec<u8>, RenderError>;

    /// Dimensions of a template, failing when it cannot be loaded.
    fn template_dimensions(&self, template_id: &str) -> Result<(u32, u32), RenderError>;
}
