//! Template-backed ticket renderer.

use std::time::Instant;
use tracing::debug;

use crate::compositor::{circle_marker, counter_badge, Compositor, OutputFormat, Overlay};
use crate::config::{Config, TicketConfig};
use crate::metrics;
use crate::qr::{Color, QrEncoder, QrStyle};
use crate::template::TemplateStore;
use crate::zone::ZoneResolver;

use super::error::RenderError;
use super::types::TicketDescriptor;
use super::Renderer;

/// Payload used by position tests when none is given.
pub const POSITION_TEST_PAYLOAD: &str = "TEST-QR-CODE-123";

const MARKER_DIAMETER: u32 = 40;
const MARKER_OPACITY: f32 = 0.5;

/// Renders tickets from template files on disk.
#[derive(Debug)]
pub struct TicketRenderer {
    templates: TemplateStore,
    zones: ZoneResolver,
    encoder: QrEncoder,
}

impl TicketRenderer {
    pub fn new(templates: TemplateStore, zones: ZoneResolver) -> Self {
        Self {
            templates,
            zones,
            encoder: QrEncoder::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TemplateStore::new(&config.templates.dir, config.templates.cache),
            ZoneResolver::new(config.templates.zones.clone()),
        )
    }

    pub fn with_encoder(mut self, encoder: QrEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Template id used for a ticket in `zone`.
    pub fn template_for<'a>(&'a self, zone: Option<&str>, config: &'a TicketConfig) -> &'a str {
        self.zones.resolve(zone, &config.template_id)
    }

    /// Rejects a QR code larger than the template's longer side before any
    /// raster is allocated for it.
    fn check_qr_size(&self, template_id: &str, config: &TicketConfig) -> Result<(), RenderError> {
        let (width, height) = self.templates.dimensions(template_id)?;
        let limit = width.max(height);
        if config.qr_size > limit {
            return Err(RenderError::validation(format!(
                "QR size {} exceeds template {} ({}x{})",
                config.qr_size, template_id, width, height
            )));
        }
        Ok(())
    }

    fn qr_style(config: &TicketConfig) -> QrStyle {
        QrStyle::new(config.qr_size)
            .with_margin(config.qr_margin)
            .with_colors(config.qr_dark, config.qr_light)
    }

    /// The bare QR code for `payload` as SVG, without a template.
    pub fn render_svg(&self, payload: &str, config: &TicketConfig) -> Result<String, RenderError> {
        let payload = validate_payload(payload)?;
        Ok(self.encoder.encode_svg(payload, &Self::qr_style(config))?)
    }

    /// Renders the default template with a high-contrast QR and a marker on
    /// the QR origin, for calibrating offsets.
    pub fn render_position_test(
        &self,
        payload: Option<&str>,
        config: &TicketConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let payload = match payload.map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => POSITION_TEST_PAYLOAD,
        };

        let base = self.templates.load(&config.template_id)?;
        self.check_qr_size(&config.template_id, config)?;
        let style = Self::qr_style(config)
            .with_margin(1)
            .with_colors(Color::RED, Color::GREEN);
        let qr = self.encoder.render(payload, &style)?;
        let radius = i64::from(MARKER_DIAMETER / 2);

        let overlays = [
            Overlay::raster(qr, config.qr_x, config.qr_y),
            Overlay::raster(
                circle_marker(MARKER_DIAMETER, Color::BLUE, MARKER_OPACITY),
                config.qr_x.saturating_sub(radius),
                config.qr_y.saturating_sub(radius),
            ),
        ];

        debug!(
            x = config.qr_x,
            y = config.qr_y,
            size = config.qr_size,
            "Rendering position test"
        );

        Ok(Compositor::new(config.overlay_tolerance).compose(
            &base,
            &overlays,
            OutputFormat::Jpeg,
            config.quality,
        )?)
    }
}

impl Renderer for TicketRenderer {
    fn render(
        &self,
        ticket: &TicketDescriptor,
        config: &TicketConfig,
    ) -> Result<Vec<u8>, RenderError> {
        let start = Instant::now();
        let payload = validate_payload(&ticket.payload)?;

        let template_id = self.template_for(ticket.zone.as_deref(), config);
        let base = self.templates.load(template_id)?;
        self.check_qr_size(template_id, config)?;
        let qr = self.encoder.render(payload, &Self::qr_style(config))?;

        let mut overlays = Vec::with_capacity(2);
        if let Some(counter) = &config.counter {
            overlays.push(Overlay::raster(
                counter_badge(
                    ticket.sequence_number,
                    counter.digit_height,
                    counter.color,
                    counter.opacity,
                ),
                counter.x,
                counter.y,
            ));
        }
        overlays.push(Overlay::raster(qr, config.qr_x, config.qr_y));

        let bytes = Compositor::new(config.overlay_tolerance).compose(
            &base,
            &overlays,
            config.format,
            config.quality,
        )?;

        let elapsed = start.elapsed();
        metrics::RENDER_DURATION
            .with_label_values(&[config.format.extension()])
            .observe(elapsed.as_secs_f64());
        debug!(
            sequence_number = ticket.sequence_number,
            template = template_id,
            size = bytes.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Ticket rendered"
        );

        Ok(bytes)
    }

    fn template_dimensions(&self, template_id: &str) -> Result<(u32, u32), RenderError> {
        Ok(self.templates.dimensions(template_id)?)
    }
}

fn validate_payload(payload: &str) -> Result<&str, RenderError> {
    if payload.trim().is_empty() {
        return Err(RenderError::validation("QR payload is required"));
    }
    Ok(payload)
}
