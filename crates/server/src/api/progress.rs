//! Progress polling handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketpress_core::{ProgressPatch, ProgressSnapshot, ProgressView};

use super::error::ApiError;
use crate::state::AppState;

/// Query parameters identifying a session
#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub session_id: Option<String>,
}

/// Request body for a progress update
#[derive(Debug, Deserialize)]
pub struct UpsertProgressBody {
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub patch: ProgressPatch,
}

#[derive(Debug, Serialize)]
pub struct DeleteProgressResponse {
    pub session_id: String,
    pub deleted: bool,
}

fn required(session_id: Option<String>) -> Result<String, ApiError> {
    match session_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ApiError::bad_request("Session ID is required")),
    }
}

/// Current progress with percentage and estimated time remaining
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Json<ProgressView>, ApiError> {
    let session_id = required(params.session_id)?;
    state
        .progress()
        .view(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Session not found: {}", session_id)))
}

/// Create or merge a session's progress
pub async fn upsert_progress(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpsertProgressBody>,
) -> Result<Json<ProgressSnapshot>, ApiError> {
    let session_id = required(body.session_id)?;
    let snapshot = state.progress().upsert(&session_id, body.patch).await?;
    Ok(Json(snapshot))
}

/// Remove a session; removing an unknown session succeeds
pub async fn delete_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SessionParams>,
) -> Result<Json<DeleteProgressResponse>, ApiError> {
    let session_id = required(params.session_id)?;
    let deleted = state.progress().delete(&session_id).await;
    Ok(Json(DeleteProgressResponse {
        session_id,
        deleted,
    }))
}
