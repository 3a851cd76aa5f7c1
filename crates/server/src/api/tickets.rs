//! Single-ticket render handlers.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use ticketpress_core::{OutputFormat, Renderer, TicketConfig, TicketDescriptor};

use super::error::ApiError;
use crate::state::AppState;

const SVG_MIME: &str = "image/svg+xml";

// ============================================================================
// Request Types
// ============================================================================

/// Request body for rendering one ticket
#[derive(Debug, Default, Deserialize)]
pub struct RenderTicketBody {
    /// Data encoded into the QR code
    pub payload: Option<String>,
    pub zone: Option<String>,
    pub display_name: Option<String>,
    /// `jpeg`, `png` or `svg` (bare QR code)
    pub format: Option<String>,
    /// Render at preview quality unless `quality` is given
    #[serde(default)]
    pub preview: bool,
    /// 1-100, clamped
    pub quality: Option<i64>,
    /// Serve as an attachment instead of inline
    #[serde(default)]
    pub download: bool,
    pub qr_size: Option<u32>,
    pub qr_x: Option<i64>,
    pub qr_y: Option<i64>,
}

/// Request body for a position test
#[derive(Debug, Default, Deserialize)]
pub struct PositionTestBody {
    pub payload: Option<String>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub size: Option<u32>,
}

/// Requested output, svg being a bare QR code.
enum RenderFormat {
    Svg,
    Raster(OutputFormat),
}

fn parse_format(format: Option<&str>, default: OutputFormat) -> Result<RenderFormat, ApiError> {
    match format.map(str::trim) {
        None | Some("") => Ok(RenderFormat::Raster(default)),
        Some(f) if f.eq_ignore_ascii_case("svg") => Ok(RenderFormat::Svg),
        Some(f) => f
            .to_ascii_lowercase()
            .parse::<OutputFormat>()
            .map(RenderFormat::Raster)
            .map_err(|_| ApiError::bad_request(format!("Unsupported format: {}", f))),
    }
}

/// Applies request overrides on top of the configured ticket settings.
fn effective_config(base: &TicketConfig, body: &RenderTicketBody, format: OutputFormat) -> TicketConfig {
    let mut config = base.clone().with_format(format);

    // Previews always use the preview quality.
    config.quality = if body.preview {
        base.preview_quality
    } else {
        body.quality.map_or(base.quality, |q| q.clamp(1, 100) as u8)
    };
    if let Some(size) = body.qr_size {
        config.qr_size = size;
    }
    if let Some(x) = body.qr_x {
        config.qr_x = x;
    }
    if let Some(y) = body.qr_y {
        config.qr_y = y;
    }

    config
}

fn content_disposition(download: bool, extension: &str) -> HeaderValue {
    let (disposition, stem) = if download {
        ("attachment", "ticket")
    } else {
        ("inline", "preview")
    };
    let value = format!(
        "{}; filename=\"{}-{}.{}\"",
        disposition,
        stem,
        Utc::now().timestamp_millis(),
        extension
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("inline"))
}

// ============================================================================
// Handlers
// ============================================================================

/// Render one ticket for preview or download
pub async fn render_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RenderTicketBody>,
) -> Result<Response, ApiError> {
    // Rejected before any template is touched.
    let payload = match body.payload.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(ApiError::bad_request("QR payload is required")),
    };

    let base = state.ticket_config();
    let format = parse_format(body.format.as_deref(), base.format)?;
    let renderer = state.renderer();

    let (bytes, mime, extension) = match format {
        RenderFormat::Svg => {
            let config = effective_config(base, &body, base.format);
            let svg = renderer.render_svg(&payload, &config)?;
            (svg.into_bytes(), SVG_MIME, "svg")
        }
        RenderFormat::Raster(format) => {
            let config = effective_config(base, &body, format);
            let mut ticket = TicketDescriptor::new(payload, 1);
            ticket.zone = body.zone.clone();
            ticket.display_name = body.display_name.clone();

            let bytes = tokio::task::spawn_blocking(move || renderer.render(&ticket, &config))
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?
                .map_err(|e| {
                    warn!(error = %e, "Ticket render failed");
                    ApiError::from(e)
                })?;
            (bytes, format.mime_type(), format.extension())
        }
    };

    debug!(size = bytes.len(), mime, preview = body.preview, "Ticket rendered");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(mime)),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(body.download, extension),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Render the default template with a calibration QR and origin marker
pub async fn position_test(
    State(state): State<Arc<AppState>>,
    body: Option<Json<PositionTestBody>>,
) -> Result<Response, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let mut config = state.ticket_config().clone();
    if let Some(size) = body.size {
        config.qr_size = size;
    }
    if let Some(x) = body.x {
        config.qr_x = x;
    }
    if let Some(y) = body.y {
        config.qr_y = y;
    }

    debug!(
        x = config.qr_x,
        y = config.qr_y,
        size = config.qr_size,
        "Position test requested"
    );

    let renderer = state.renderer();
    let bytes = tokio::task::spawn_blocking(move || {
        renderer.render_position_test(body.payload.as_deref(), &config)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))??;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("inline; filename=\"test_position.jpg\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
