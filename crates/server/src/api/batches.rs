//! Batch submission handler.

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use ticketpress_core::TicketDescriptor;

use super::error::ApiError;
use crate::state::AppState;

pub const TICKETS_TOTAL_HEADER: HeaderName = HeaderName::from_static("x-tickets-total");
pub const TICKETS_GENERATED_HEADER: HeaderName = HeaderName::from_static("x-tickets-generated");
pub const TICKETS_FAILED_HEADER: HeaderName = HeaderName::from_static("x-tickets-failed");

/// Ticket in a batch request
#[derive(Debug, Deserialize)]
pub struct BatchTicketBody {
    /// A blank payload fails this ticket only
    #[serde(default)]
    pub payload: String,
    pub zone: Option<String>,
    pub display_name: Option<String>,
    /// Defaults to the 1-based position in the list
    pub sequence_number: Option<u64>,
}

/// Request body for a batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchBody {
    pub tickets: Option<Vec<BatchTicketBody>>,
    pub session_id: Option<String>,
}

fn descriptors(tickets: Vec<BatchTicketBody>) -> Vec<TicketDescriptor> {
    tickets
        .into_iter()
        .enumerate()
        .map(|(i, t)| TicketDescriptor {
            payload: t.payload,
            zone: t.zone,
            display_name: t.display_name,
            sequence_number: t.sequence_number.unwrap_or(i as u64 + 1),
        })
        .collect()
}

/// Render a list of tickets into one zip archive
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBatchBody>,
) -> Result<Response, ApiError> {
    let tickets = match body.tickets {
        Some(tickets) if !tickets.is_empty() => descriptors(tickets),
        _ => return Err(ApiError::bad_request("No tickets provided")),
    };
    let session_id = match body.session_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(ApiError::bad_request("Session ID is required")),
    };

    info!(session_id = %session_id, tickets = tickets.len(), "Batch submitted");

    let result = state
        .batches()
        .run(
            tickets,
            &session_id,
            state.ticket_config(),
            Some(state.shutdown_token().child_token()),
        )
        .await?;

    let filename = format!(
        "attachment; filename=\"tickets_{}.zip\"",
        Utc::now().timestamp_millis()
    );

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&filename)
                    .map_err(|e| ApiError::internal(e.to_string()))?,
            ),
            (TICKETS_TOTAL_HEADER, HeaderValue::from(result.total)),
            (TICKETS_GENERATED_HEADER, HeaderValue::from(result.success_count)),
            (TICKETS_FAILED_HEADER, HeaderValue::from(result.fail_count)),
        ],
        result.archive,
    )
        .into_response())
}
