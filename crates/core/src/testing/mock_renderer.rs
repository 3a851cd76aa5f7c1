//! Mock renderer for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::TicketConfig;
use crate::render::{RenderError, Renderer, TicketDescriptor};
use crate::template::TemplateError;

#[derive(Debug, Default)]
struct MockState {
    failures: HashMap<u64, String>,
    delays: HashMap<u64, Duration>,
    rendered: Vec<u64>,
}

/// Mock implementation of the Renderer trait.
///
/// Provides controllable behavior for testing:
/// - Fail chosen sequence numbers
/// - Delay renders to exercise timeouts and concurrency
/// - Report a missing default template
/// - Record what was rendered and the peak number of concurrent renders
///
/// Output is `IMG:<payload>` as bytes. Clones share state.
#[derive(Debug, Clone)]
pub struct MockRenderer {
    state: Arc<Mutex<MockState>>,
    missing_templates: Arc<Mutex<HashSet<String>>>,
    default_delay: Duration,
    template_size: (u32, u32),
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            missing_templates: Arc::new(Mutex::new(HashSet::new())),
            default_delay: Duration::ZERO,
            template_size: (12_500, 6_000),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Renders of `sequence_number` fail with `message`.
    pub fn fail_with(self, sequence_number: u64, message: &str) -> Self {
        self.state()
            .failures
            .insert(sequence_number, message.to_string());
        self
    }

    /// Every render sleeps for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Renders of `sequence_number` sleep for `delay`.
    pub fn with_delay_for(self, sequence_number: u64, delay: Duration) -> Self {
        self.state().delays.insert(sequence_number, delay);
        self
    }

    /// Dimensions reported for every template.
    pub fn with_template_size(mut self, width: u32, height: u32) -> Self {
        self.template_size = (width, height);
        self
    }

    /// Reports the default template (`ticket.jpg`) as missing.
    pub fn with_missing_template(self) -> Self {
        self.remove_template("ticket.jpg");
        self
    }

    /// Reports `template_id` as missing.
    pub fn remove_template(&self, template_id: &str) {
        self.missing_templates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(template_id.to_string());
    }

    /// Number of render calls so far.
    pub fn render_count(&self) -> usize {
        self.state().rendered.len()
    }

    /// Sequence numbers rendered, in call order.
    pub fn rendered(&self) -> Vec<u64> {
        self.state().rendered.clone()
    }

    /// Peak number of renders running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Renderer for MockRenderer {
    fn render(
        &self,
        ticket: &TicketDescriptor,
        _config: &TicketConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let (delay, failure) = {
            let mut state = self.state();
            state.rendered.push(ticket.sequence_number);
            (
                state
                    .delays
                    .get(&ticket.sequence_number)
                    .copied()
                    .unwrap_or(self.default_delay),
                state.failures.get(&ticket.sequence_number).cloned(),
            )
        };

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if ticket.payload.trim().is_empty() {
            return Err(RenderError::validation("QR payload is required"));
        }
        if let Some(message) = failure {
            return Err(RenderError::Internal(message));
        }

        Ok(format!("IMG:{}", ticket.payload).into_bytes())
    }

    fn template_dimensions(&self, template_id: &str) -> Result<(u32, u32), RenderError> {
        let missing = self
            .missing_templates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(template_id);
        if missing {
            return Err(TemplateError::NotFound(template_id.to_string()).into());
        }
        Ok(self.template_size)
    }
}
