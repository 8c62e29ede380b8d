//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState, SuccessResponse};
use kharcha_core::Budget;

/// Budget create/update body
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub category: String,
    pub monthly_budget: f64,
}

/// GET /api/budgets - Active budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Budget>>, AppError> {
    Ok(Json(state.db.list_budgets()?))
}

/// POST /api/budgets - Create or replace a category budget
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetBudgetRequest>,
) -> Result<Json<Budget>, AppError> {
    let budget = state
        .db
        .set_budget(&req.category, req.monthly_budget)
        .map_err(AppError::from_core)?;

    info!(category = %budget.category, amount = budget.monthly_budget, "Budget set");
    Ok(Json(budget))
}

/// DELETE /api/budgets/:category - Stop alerting on a category
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .db
        .deactivate_budget(&category)
        .map_err(AppError::from_core)?;

    info!(category = %category, "Budget deactivated");
    Ok(Json(SuccessResponse { success: true }))
}
