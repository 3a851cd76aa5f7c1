//! Progress store implementation.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ProgressConfig;
use crate::metrics;

use super::clock::{Clock, SystemClock};
use super::types::{ProgressPatch, ProgressSnapshot, ProgressView, SweepReport};

/// Error type for progress operations.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Session id was empty or blank.
    #[error("Session ID is required")]
    MissingSessionId,

    /// A live session with this id already exists.
    #[error("Session already exists: {0}")]
    SessionExists(String),
}

/// Process-wide session progress, shared by the batch path and pollers.
///
/// Cloning is cheap; clones share the same sessions.
#[derive(Clone)]
pub struct ProgressStore {
    sessions: Arc<RwLock<HashMap<String, ProgressSnapshot>>>,
    config: ProgressConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn session_key(session_id: &str) -> Result<&str, ProgressError> {
    let key = session_id.trim();
    if key.is_empty() {
        return Err(ProgressError::MissingSessionId);
    }
    Ok(key)
}

impl ProgressStore {
    pub fn new(config: ProgressConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ProgressConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            clock,
        }
    }

    /// Creates or merges into a session and stamps `last_updated`.
    pub async fn upsert(
        &self,
        session_id: &str,
        patch: ProgressPatch,
    ) -> Result<ProgressSnapshot, ProgressError> {
        let key = session_key(session_id)?;
        let now = self.clock.now();

        let mut sessions = self.sessions.write().await;
        self.sweep_locked(&mut sessions, now);

        let snapshot = sessions
            .entry(key.to_string())
            .or_insert_with(|| ProgressSnapshot::new(key, now));
        snapshot.apply(&patch, now);

        debug!(
            session_id = key,
            current = snapshot.current,
            total = snapshot.total,
            completed = snapshot.completed,
            "Progress updated"
        );
        Ok(snapshot.clone())
    }

    /// Starts a new session with `total` items.
    ///
    /// Fails if the id names a live session; expired sessions are swept
    /// first, so their ids can be reused.
    pub async fn begin(
        &self,
        session_id: &str,
        total: u64,
    ) -> Result<ProgressSnapshot, ProgressError> {
        let key = session_key(session_id)?;
        let now = self.clock.now();

        let mut sessions = self.sessions.write().await;
        self.sweep_locked(&mut sessions, now);
        if sessions.contains_key(key) {
            return Err(ProgressError::SessionExists(key.to_string()));
        }

        let mut snapshot = ProgressSnapshot::new(key, now);
        snapshot.apply(&ProgressPatch::new().total(total), now);
        sessions.insert(key.to_string(), snapshot.clone());

        debug!(session_id = key, total, "Progress session started");
        Ok(snapshot)
    }

    /// Returns a session's snapshot. Reading never refreshes `last_updated`.
    pub async fn get(&self, session_id: &str) -> Option<ProgressSnapshot> {
        let key = session_key(session_id).ok()?;
        let now = self.clock.now();

        let mut sessions = self.sessions.write().await;
        self.sweep_locked(&mut sessions, now);
        sessions.get(key).cloned()
    }

    /// Snapshot with percentage and remaining-time estimate.
    pub async fn view(&self, session_id: &str) -> Option<ProgressView> {
        let snapshot = self.get(session_id).await?;
        let now = self.clock.now();
        Some(ProgressView {
            percentage: snapshot.percentage(),
            estimated_time_remaining: snapshot.estimated_seconds_remaining(now),
            snapshot,
        })
    }

    /// Removes a session. Returns whether it existed; absent is not an error.
    pub async fn delete(&self, session_id: &str) -> bool {
        let Ok(key) = session_key(session_id) else {
            return false;
        };
        let removed = self.sessions.write().await.remove(key).is_some();
        if removed {
            debug!(session_id = key, "Progress session deleted");
        }
        removed
    }

    /// Evicts expired sessions.
    pub async fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        self.sweep_locked(&mut sessions, now)
    }

    /// Number of tracked sessions, expired ones included until the next sweep.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn sweep_locked(
        &self,
        sessions: &mut HashMap<String, ProgressSnapshot>,
        now: DateTime<Utc>,
    ) -> SweepReport {
        let completed_ttl = ChronoDuration::seconds(self.config.completed_ttl_secs as i64);
        let abandoned_ttl = ChronoDuration::seconds(self.config.abandoned_ttl_secs as i64);
        let mut report = SweepReport::default();

        sessions.retain(|_, snapshot| {
            let idle = now - snapshot.last_updated;
            if snapshot.completed && idle > completed_ttl {
                report.completed += 1;
                false
            } else if idle > abandoned_ttl {
                report.abandoned += 1;
                false
            } else {
                true
            }
        });

        if report.completed > 0 {
            metrics::PROGRESS_EVICTIONS
                .with_label_values(&["completed"])
                .inc_by(report.completed as u64);
        }
        if report.abandoned > 0 {
            metrics::PROGRESS_EVICTIONS
                .with_label_values(&["abandoned"])
                .inc_by(report.abandoned as u64);
        }
        if report.total() > 0 {
            debug!(
                completed = report.completed,
                abandoned = report.abandoned,
                remaining = sessions.len(),
                "Swept progress sessions"
            );
        }

        report
    }

    /// Sweeps every `sweep_interval_secs` until `shutdown` is cancelled.
    pub fn spawn_sweeper(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        let period = Duration::from_secs(self.config.sweep_interval_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(interval_secs = period.as_secs(), "Progress sweeper started");

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        store.sweep().await;
                    }
                }
            }

            info!("Progress sweeper stopped");
        })
    }
}
