//! Template storage.
//!
//! Templates are base raster images kept in a directory and addressed by
//! file name. Each load is a single read whose failure is classified, so a
//! missing template is reported as [`TemplateError::NotFound`] rather than
//! through a separate existence check.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketpress_core::template::TemplateStore;
//!
//! let store = TemplateStore::new("public", true);
//! let bytes = store.load("ticket_KV.jpg")?;
//! let (width, height) = store.dimensions("ticket_KV.jpg")?;
//! ```

mod error;
mod store;

pub use error::TemplateError;
pub use store::TemplateStore;
