//! Spending alert handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{AppError, AppState};
use kharcha_core::{evaluate_budget_alerts, format_alert, reference_date, SpendingAlert};

#[derive(Debug, Serialize)]
pub struct SpendingAlertsResponse {
    pub version: i64,
    /// Alerts cover the calendar month containing this date
    pub reference_date: NaiveDate,
    pub alerts: Vec<SpendingAlert>,
    /// One rendered line per alert, in the same order
    pub messages: Vec<String>,
}

/// GET /api/spending-alerts - Overspent budgets for the latest month
pub async fn spending_alerts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SpendingAlertsResponse>, AppError> {
    let (transactions, version) = state.shared_dataset()?;
    let budgets = state.db.budget_table()?;
    let reference = reference_date(&transactions);

    let alerts = evaluate_budget_alerts(&transactions, &budgets, reference);
    let messages = alerts.iter().map(format_alert).collect();

    Ok(Json(SpendingAlertsResponse {
        version: version.version,
        reference_date: reference,
        alerts,
        messages,
    }))
}
