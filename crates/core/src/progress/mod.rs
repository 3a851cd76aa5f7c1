//! In-memory progress tracking keyed by session id.
//!
//! Sessions move `absent -> in progress -> completed -> absent`. Two sweep
//! rules evict them: completed sessions idle past `completed_ttl`, and any
//! session idle past `abandoned_ttl`. Sweeps run on every read and write and
//! from an optional background task.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketpress_core::progress::{ProgressPatch, ProgressStore};
//!
//! let store = ProgressStore::new(config.progress.clone());
//! store.upsert("session-1", ProgressPatch::new().total(10)).await?;
//! store.upsert("session-1", ProgressPatch::new().current(2).successful(2)).await?;
//! let view = store.view("session-1").await;
//! ```

mod clock;
mod store;
mod types;

pub use clock::{Clock, SystemClock};
pub use store::{ProgressError, ProgressStore};
pub use types::{ProgressPatch, ProgressSnapshot, ProgressView, SweepReport};
