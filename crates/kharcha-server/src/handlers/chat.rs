//! Chat handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use kharcha_core::{answer_with_config, reference_date, BudgetTable, ChatAnswer, Transaction};

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// Answer plus the version of the data it was computed from
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub answer: ChatAnswer,
    pub version: i64,
}

/// POST /api/chat - Ask a question about the shared dataset
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let (transactions, version) = state.shared_dataset()?;
    let budgets = state.db.budget_table()?;
    let answer = ask(&state, &req.question, &transactions, &budgets)?;

    Ok(Json(ChatResponse {
        answer,
        version: version.version,
    }))
}

/// Run a question against a snapshot, anchored to its latest transaction
pub(crate) fn ask(
    state: &AppState,
    question: &str,
    transactions: &[Transaction],
    budgets: &BudgetTable,
) -> Result<ChatAnswer, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::bad_request("Question is required"));
    }

    Ok(answer_with_config(
        question,
        reference_date(transactions),
        transactions,
        budgets,
        &state.settings.query,
    ))
}
