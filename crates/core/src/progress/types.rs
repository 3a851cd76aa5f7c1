//! Progress types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of one batch session.
///
/// Upserts keep `successful + failed <= current <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub session_id: String,
    pub current: u64,
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ProgressSnapshot {
    pub(crate) fn new(session_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            current: 0,
            total: 0,
            successful: 0,
            failed: 0,
            completed: false,
            started_at: now,
            last_updated: now,
        }
    }

    /// Applies `patch` and restores the counter invariants.
    pub(crate) fn apply(&mut self, patch: &ProgressPatch, now: DateTime<Utc>) {
        if let Some(total) = patch.total {
            self.total = total;
        }
        if let Some(successful) = patch.successful {
            self.successful = successful;
        }
        if let Some(failed) = patch.failed {
            self.failed = failed;
        }
        if let Some(current) = patch.current {
            self.current = self.current.max(current);
        }
        if patch.completed == Some(true) {
            self.completed = true;
        }

        self.current = self.current.max(self.successful.saturating_add(self.failed));
        self.total = self.total.max(self.current);
        self.last_updated = now;
    }

    /// Share of the batch processed, 0-100.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return if self.completed { 100 } else { 0 };
        }
        let done = u128::from(self.current.min(self.total));
        (done * 100 / u128::from(self.total)) as u8
    }

    /// Seconds left, extrapolated from the average time per processed item.
    /// `None` before the first item.
    pub fn estimated_seconds_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        if self.current == 0 {
            return None;
        }
        let elapsed_ms = (now - self.started_at).num_milliseconds().max(0) as u128;
        let remaining = u128::from(self.total.saturating_sub(self.current));
        let seconds = elapsed_ms * remaining / u128::from(self.current) / 1000;
        Some(u64::try_from(seconds).unwrap_or(u64::MAX))
    }
}

/// Partial update; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressPatch {
    #[serde(default)]
    pub current: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub successful: Option<u64>,
    #[serde(default)]
    pub failed: Option<u64>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl ProgressPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(mut self, current: u64) -> Self {
        self.current = Some(current);
        self
    }

    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn successful(mut self, successful: u64) -> Self {
        self.successful = Some(successful);
        self
    }

    pub fn failed(mut self, failed: u64) -> Self {
        self.failed = Some(failed);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Snapshot plus derived fields, as served to pollers.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    #[serde(flatten)]
    pub snapshot: ProgressSnapshot,
    pub percentage: u8,
    /// Seconds; null until the first item is processed.
    pub estimated_time_remaining: Option<u64>,
}

/// Sessions evicted by one sweep, per rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub completed: usize,
    pub abandoned: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.completed + self.abandoned
    }
}
