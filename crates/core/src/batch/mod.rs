//! Wave-based batch rendering.
//!
//! [`BatchController::run`] splits the ticket list into waves of
//! `wave_size`, renders each wave concurrently, streams results into one zip
//! archive and reports progress after every wave. A failing ticket becomes an
//! error record in the archive and an entry in the failure manifest; it never
//! aborts the batch.
//!
//! Only precondition failures (blank session id, missing default template),
//! archive failures and cancellation surface as [`BatchError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketpress_core::batch::BatchController;
//!
//! let controller = BatchController::new(renderer, progress, config.batch.clone());
//! let result = controller
//!     .run(tickets, "session-1", &config.ticket, None)
//!     .await?;
//! println!("{} ok, {} failed", result.success_count, result.fail_count);
//! ```

mod controller;
mod error;
mod naming;
mod types;

pub use controller::BatchController;
pub use error::BatchError;
pub use naming::{error_entry_name, error_record, sanitize_display_name, EntryNames};
pub use types::{BatchResult, FailureRecord};
