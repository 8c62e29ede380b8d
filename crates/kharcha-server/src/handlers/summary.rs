//! Dashboard summary and chart handlers
//!
//! Every response is `{version, data}` so a client can drop cached charts
//! as soon as the shared dataset changes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, MAX_RESULT_LIMIT};
use kharcha_core::summary::{
    self, CategoryPie, IncomeVsExpenses, MerchantBars, MonthlyTrend,
};
use kharcha_core::{reference_date, resolve_time_window, DataPoint, DateRange, Transaction};

/// Default `limit` for the summary endpoint
const SUMMARY_MERCHANT_LIMIT: usize = 5;

/// Default `limit` for chart endpoints
const CHART_MERCHANT_LIMIT: usize = 10;

/// Query parameters for summaries
///
/// A window comes either from `period` or from `start_date`/`end_date`
/// (each optional, inclusive), never both.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// `this_month`, `last_month`, `this_week` or `last_week`
    pub period: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl SummaryQuery {
    fn limit(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, MAX_RESULT_LIMIT)
    }

    /// Resolve the requested window against the snapshot's latest date
    fn window(&self, transactions: &[Transaction]) -> Result<Option<DateRange>, AppError> {
        let explicit = self.start_date.is_some() || self.end_date.is_some();

        match self.period.as_deref() {
            Some(_) if explicit => Err(AppError::bad_request(
                "Use either period or start_date/end_date, not both",
            )),
            Some(period) => resolve_time_window(
                &period.replace('_', " "),
                reference_date(transactions),
            )
            .map(Some)
            .ok_or_else(|| AppError::bad_request(&format!("Unknown period: {}", period))),
            None if explicit => Ok(Some(DateRange::new(
                self.start_date.unwrap_or(NaiveDate::MIN),
                self.end_date.unwrap_or(NaiveDate::MAX),
            ))),
            None => Ok(None),
        }
    }
}

/// Payload tagged with the dataset version it was computed from
#[derive(Debug, Serialize)]
pub struct VersionedResponse<T> {
    pub version: i64,
    pub data: T,
}

/// GET /api/summary/by_category - Expense per category, largest first
pub async fn summary_by_category(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<VersionedResponse<Vec<DataPoint>>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;
    let window = params.window(&transactions)?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::spending_by_category(&transactions, window),
    }))
}

/// GET /api/summary/top_merchants - Merchants by total spend
pub async fn summary_top_merchants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<VersionedResponse<Vec<DataPoint>>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;
    let window = params.window(&transactions)?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::top_merchants(&transactions, params.limit(SUMMARY_MERCHANT_LIMIT), window),
    }))
}

/// GET /api/summary/monthly_totals - Expense per month, oldest first
pub async fn summary_monthly_totals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VersionedResponse<Vec<DataPoint>>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::monthly_totals(&transactions),
    }))
}

/// GET /api/visualization/category_pie
pub async fn category_pie(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VersionedResponse<CategoryPie>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::category_pie(&transactions),
    }))
}

/// GET /api/visualization/monthly_trend
pub async fn monthly_trend(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VersionedResponse<MonthlyTrend>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::monthly_trend(&transactions),
    }))
}

/// GET /api/visualization/top_merchants_by_total_spending
pub async fn top_merchants_by_total_spending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<VersionedResponse<MerchantBars>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::top_merchants_by_total_spending(
            &transactions,
            params.limit(CHART_MERCHANT_LIMIT),
        ),
    }))
}

/// GET /api/visualization/top_merchants_by_single_payment
pub async fn top_merchants_by_single_payment(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<VersionedResponse<MerchantBars>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::top_merchants_by_single_payment(
            &transactions,
            params.limit(CHART_MERCHANT_LIMIT),
        ),
    }))
}

/// GET /api/visualization/income_vs_expenses
pub async fn income_vs_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VersionedResponse<IncomeVsExpenses>>, AppError> {
    let (transactions, version) = state.shared_dataset()?;

    Ok(Json(VersionedResponse {
        version: version.version,
        data: summary::income_vs_expenses(&transactions),
    }))
}
