//! Batch controller implementation.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::archive::{ArchiveEntry, ArchiveWriter};
use crate::compositor::overhang;
use crate::config::{BatchConfig, TicketConfig};
use crate::metrics;
use crate::progress::{ProgressPatch, ProgressStore};
use crate::render::{ErrorKind, RenderError, Renderer, TicketDescriptor};

use super::error::BatchError;
use super::naming::{error_record, truncate_chars, EntryNames};
use super::types::{BatchResult, FailureRecord};

/// Result of one ticket's unit of work.
#[derive(Debug)]
enum TicketOutcome {
    Rendered,
    Failed { index: usize, record: FailureRecord },
}

/// Per-batch state shared with wave tasks.
struct BatchRun<R> {
    renderer: Arc<R>,
    ticket_config: TicketConfig,
    archive: ArchiveWriter,
    names: EntryNames,
    timeout: Option<Duration>,
    max_error_len: usize,
}

/// Drives ticket rendering in waves.
pub struct BatchController<R: Renderer> {
    renderer: Arc<R>,
    progress: ProgressStore,
    config: BatchConfig,
}

impl<R: Renderer + 'static> BatchController<R> {
    pub fn new(renderer: Arc<R>, progress: ProgressStore, config: BatchConfig) -> Self {
        Self {
            renderer,
            progress,
            config,
        }
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Renders `tickets` into one archive, reporting progress under `session_id`.
    ///
    /// `session_id` must not name a live session. On a batch-level error the
    /// session this run created is removed and no archive is returned.
    pub async fn run(
        &self,
        tickets: Vec<TicketDescriptor>,
        session_id: &str,
        ticket_config: &TicketConfig,
        cancel: Option<CancellationToken>,
    ) -> Result<BatchResult, BatchError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(BatchError::validation("Session ID is required"));
        }

        let start = Instant::now();
        let cancel = cancel.unwrap_or_default();
        let total = tickets.len();

        let result = match self.preflight(&tickets, ticket_config) {
            Ok(()) => {
                self.run_waves(tickets, session_id, ticket_config, &cancel)
                    .await
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(batch) => {
                metrics::BATCHES_TOTAL.with_label_values(&["completed"]).inc();
                metrics::BATCH_DURATION
                    .with_label_values(&[])
                    .observe(start.elapsed().as_secs_f64());
                metrics::ARCHIVE_SIZE
                    .with_label_values(&[])
                    .observe(batch.archive.len() as f64);
                info!(
                    session_id,
                    total,
                    success = batch.success_count,
                    failed = batch.fail_count,
                    archive_bytes = batch.archive.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Batch completed"
                );
            }
            Err(e) => {
                metrics::BATCHES_TOTAL.with_label_values(&[e.label()]).inc();
                error!(session_id, total, error = %e, "Batch failed");
            }
        }

        result
    }

    /// Checks batch-level preconditions before any session exists.
    fn preflight(
        &self,
        tickets: &[TicketDescriptor],
        ticket_config: &TicketConfig,
    ) -> Result<(), BatchError> {
        if tickets.is_empty() {
            return Ok(());
        }

        let template_id = &ticket_config.template_id;
        let (width, height) = self
            .renderer
            .template_dimensions(template_id)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BatchError::DefaultTemplateMissing(template_id.clone()),
                ErrorKind::Validation => BatchError::Validation(e.to_string()),
                _ => BatchError::Internal(e.to_string()),
            })?;

        let size = ticket_config.qr_size;
        let excess = overhang(
            (width, height),
            (size, size),
            ticket_config.qr_x,
            ticket_config.qr_y,
        );
        if excess > u64::from(ticket_config.overlay_tolerance) {
            warn!(
                template = %template_id,
                template_width = width,
                template_height = height,
                qr_x = ticket_config.qr_x,
                qr_y = ticket_config.qr_y,
                qr_size = size,
                "QR code exceeds template bounds and will be clipped"
            );
        }

        Ok(())
    }

    async fn run_waves(
        &self,
        tickets: Vec<TicketDescriptor>,
        session_id: &str,
        ticket_config: &TicketConfig,
        cancel: &CancellationToken,
    ) -> Result<BatchResult, BatchError> {
        self.progress
            .begin(session_id, tickets.len() as u64)
            .await?;

        let result = self
            .process_waves(tickets, session_id, ticket_config, cancel)
            .await;
        if result.is_err() {
            self.progress.delete(session_id).await;
        }
        result
    }

    async fn process_waves(
        &self,
        tickets: Vec<TicketDescriptor>,
        session_id: &str,
        ticket_config: &TicketConfig,
        cancel: &CancellationToken,
    ) -> Result<BatchResult, BatchError> {
        let total = tickets.len() as u64;
        let wave_size = self.config.wave_size.max(1);
        let cooldown = Duration::from_millis(self.config.wave_cooldown_ms);
        let run = Arc::new(BatchRun {
            renderer: Arc::clone(&self.renderer),
            ticket_config: ticket_config.clone(),
            archive: ArchiveWriter::open(self.config.compression_level),
            names: EntryNames::assign(&tickets, ticket_config.format.extension()),
            timeout: (self.config.ticket_timeout_secs > 0)
                .then(|| Duration::from_secs(self.config.ticket_timeout_secs)),
            max_error_len: self.config.max_error_len,
        });
        let permits = Arc::new(Semaphore::new(wave_size));

        let waves = tickets.len().div_ceil(wave_size);
        let mut processed = 0u64;
        let mut successful = 0u64;
        let mut failures: Vec<(usize, FailureRecord)> = Vec::new();

        for (wave, chunk) in tickets.chunks(wave_size).enumerate() {
            if cancel.is_cancelled() {
                warn!(session_id, wave, processed, "Batch cancelled at wave boundary");
                return Err(BatchError::Cancelled);
            }

            let offset = wave * wave_size;
            let handles: Vec<_> = chunk
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, ticket)| {
                    let run = Arc::clone(&run);
                    let permits = Arc::clone(&permits);
                    tokio::spawn(async move {
                        let _permit = permits
                            .acquire_owned()
                            .await
                            .map_err(|e| BatchError::Internal(e.to_string()))?;
                        process_ticket(run, offset + i, ticket).await
                    })
                })
                .collect();

            for joined in join_all(handles).await {
                let outcome = joined.map_err(|e| BatchError::Internal(e.to_string()))??;
                processed += 1;
                match outcome {
                    TicketOutcome::Rendered => successful += 1,
                    TicketOutcome::Failed { index, record } => failures.push((index, record)),
                }
            }

            metrics::WAVES_TOTAL.inc();
            self.progress
                .upsert(
                    session_id,
                    ProgressPatch::new()
                        .current(processed)
                        .successful(successful)
                        .failed(failures.len() as u64),
                )
                .await?;
            info!(
                session_id,
                wave = wave + 1,
                waves,
                processed,
                total,
                "Wave finished"
            );

            if wave + 1 < waves && !cooldown.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(cooldown) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        // Timed-out renders may still hold a reference; they never write.
        let finisher = Arc::clone(&run);
        let archive = tokio::task::spawn_blocking(move || finisher.archive.finalize())
            .await
            .map_err(|e| BatchError::Internal(e.to_string()))??;

        failures.sort_by_key(|(index, _)| *index);
        let failures: Vec<FailureRecord> = failures.into_iter().map(|(_, r)| r).collect();
        let fail_count = failures.len() as u64;

        self.progress
            .upsert(
                session_id,
                ProgressPatch::new()
                    .current(total)
                    .successful(successful)
                    .failed(fail_count)
                    .completed(true),
            )
            .await?;

        Ok(BatchResult {
            archive,
            total,
            success_count: successful,
            fail_count,
            failures,
        })
    }
}

/// Renders one ticket and writes its image or error record.
///
/// Render failures are folded into the outcome; only archive failures escape.
async fn process_ticket<R: Renderer + 'static>(
    run: Arc<BatchRun<R>>,
    index: usize,
    ticket: TicketDescriptor,
) -> Result<TicketOutcome, BatchError> {
    let sequence_number = ticket.sequence_number;
    debug!(sequence_number, "Rendering ticket");

    let rendered = render_with_timeout(&run, ticket.clone()).await;
    let result_label = match &rendered {
        Ok(_) => "success",
        Err(RenderError::Timeout(_)) => "timeout",
        Err(_) => "failed",
    };
    metrics::TICKETS_RENDERED
        .with_label_values(&[result_label])
        .inc();

    let (entry, outcome) = match rendered {
        Ok(bytes) => (
            ArchiveEntry::new(run.names.image(index), bytes),
            TicketOutcome::Rendered,
        ),
        Err(e) => {
            let message = truncate_chars(&e.to_string(), run.max_error_len);
            warn!(sequence_number, error = %message, "Ticket failed");
            (
                ArchiveEntry::new(
                    run.names.error(index),
                    error_record(sequence_number, &ticket.payload, &message),
                ),
                TicketOutcome::Failed {
                    index,
                    record: FailureRecord {
                        sequence_number,
                        error: message,
                    },
                },
            )
        }
    };

    let writer = Arc::clone(&run);
    tokio::task::spawn_blocking(move || writer.archive.append(entry))
        .await
        .map_err(|e| BatchError::Internal(e.to_string()))??;

    Ok(outcome)
}

async fn render_with_timeout<R: Renderer + 'static>(
    run: &Arc<BatchRun<R>>,
    ticket: TicketDescriptor,
) -> Result<Vec<u8>, RenderError> {
    let worker = Arc::clone(run);
    let task = tokio::task::spawn_blocking(move || {
        worker.renderer.render(&ticket, &worker.ticket_config)
    });

    let joined = match run.timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => return Err(RenderError::Timeout(limit)),
        },
        None => task.await,
    };

    joined.unwrap_or_else(|e| Err(RenderError::Internal(format!("render task failed: {}", e))))
}
