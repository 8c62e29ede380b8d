//! Session handlers
//!
//! Each session answers questions from its own uploaded snapshot. Budgets are
//! shared across sessions.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::chat::{ask, ChatRequest, ChatResponse};
use super::import::{read_csv_upload, UploadResponse};
use crate::{AppError, AppState, SuccessResponse};
use kharcha_core::summary::{dataset_analytics, DatasetAnalytics};
use kharcha_core::{import_csv, ImportTarget, Session};

/// Session creation body
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub session_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionAnalyticsResponse {
    pub session_id: String,
    pub version: i64,
    #[serde(flatten)]
    pub analytics: DatasetAnalytics,
}

/// POST /api/sessions - Start an empty session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<Json<Session>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    Ok(Json(state.db.create_session(req.session_name.as_deref())?))
}

/// GET /api/sessions - Sessions by most recent activity
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Session>>, AppError> {
    Ok(Json(state.db.list_sessions()?))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_session(&id).map_err(AppError::from_core)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/sessions/:id/upload - Replace a session's snapshot
///
/// The shared dataset and other sessions are left untouched.
pub async fn upload_session_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    require_session(&state, &id)?;

    let (filename, data) = read_csv_upload(multipart, state.config.max_upload_bytes).await?;
    info!(session_id = %id, filename = %filename, bytes = data.len(), "Session upload");

    let report = import_csv(
        &state.db,
        data.as_slice(),
        ImportTarget::Session(&id),
        &state.settings.classifier,
    )
    .map_err(AppError::import)?;

    Ok(Json(report.into()))
}

/// GET /api/sessions/:id/analytics - Totals for a session's snapshot
pub async fn session_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionAnalyticsResponse>, AppError> {
    let session = require_session(&state, &id)?;
    let transactions = state
        .db
        .session_transactions(&id)
        .map_err(AppError::from_core)?;
    state.db.touch_session(&id).map_err(AppError::from_core)?;

    Ok(Json(SessionAnalyticsResponse {
        session_id: session.session_id,
        version: session.version,
        analytics: dataset_analytics(&transactions),
    }))
}

/// POST /api/sessions/:id/chat - Ask a question about a session's snapshot
pub async fn session_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session = require_session(&state, &id)?;
    let transactions = state
        .db
        .session_transactions(&id)
        .map_err(AppError::from_core)?;
    let budgets = state.db.budget_table()?;

    let answer = ask(&state, &req.question, &transactions, &budgets)?;
    state.db.touch_session(&id).map_err(AppError::from_core)?;

    Ok(Json(ChatResponse {
        answer,
        version: session.version,
    }))
}

fn require_session(state: &AppState, id: &str) -> Result<Session, AppError> {
    state
        .db
        .get_session(id)?
        .ok_or_else(|| AppError::not_found("Session not found"))
}
