//! Health and dataset status

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    /// Shared dataset version; changes on every upload or clear
    pub version: i64,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub transaction_count: i64,
    /// Anchor for "this month" style questions
    pub latest_date: Option<NaiveDate>,
    pub active_budgets: usize,
}

/// GET /api/status - Dataset version and size
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, AppError> {
    let version = state.db.dataset_version()?;

    Ok(Json(StatusResponse {
        ok: true,
        version: version.version,
        refreshed_at: version.refreshed_at,
        transaction_count: state.db.count_transactions()?,
        latest_date: state.db.latest_transaction_date()?,
        active_budgets: state.db.list_budgets()?.len(),
    }))
}
