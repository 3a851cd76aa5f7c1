use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use ticketpress_core::{
    BatchController, Config, ProgressStore, SanitizedConfig, TicketConfig, TicketRenderer,
};

/// Shared application state
pub struct AppState {
    config: Config,
    renderer: Arc<TicketRenderer>,
    batches: BatchController<TicketRenderer>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, progress: ProgressStore, shutdown: CancellationToken) -> Self {
        let renderer = Arc::new(TicketRenderer::from_config(&config));
        let batches =
            BatchController::new(Arc::clone(&renderer), progress, config.batch.clone());

        Self {
            config,
            renderer,
            batches,
            shutdown,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn ticket_config(&self) -> &TicketConfig {
        &self.config.ticket
    }

    pub fn renderer(&self) -> Arc<TicketRenderer> {
        Arc::clone(&self.renderer)
    }

    pub fn batches(&self) -> &BatchController<TicketRenderer> {
        &self.batches
    }

    pub fn progress(&self) -> &ProgressStore {
        self.batches.progress()
    }

    /// Cancelled when the server begins shutting down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
