//! Domain models for Kharcha

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned when nothing else matches
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A financial transaction
///
/// Immutable once stored; datasets are replaced in bulk on re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Original narration from the upload
    pub description: String,
    /// Short label derived from the description
    pub merchant: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    /// Canonical category label, or `Uncategorized`
    pub category: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// A monthly budget for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Compared case-sensitively against transaction categories
    pub category: String,
    pub monthly_budget: f64,
    /// Inactive budgets are excluded from alerting and listing
    pub is_active: bool,
}

/// An overspend notice for the current month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingAlert {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub overspend_amount: f64,
    /// `None` when the budget is zero (percent is undefined)
    pub overspend_percent: Option<f64>,
}

/// A single labelled value in a ranked or charted result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Structured answer to a chat question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataPoint>>,
}

impl ChatAnswer {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            data: None,
        }
    }

    pub fn with_data(answer: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            answer: answer.into(),
            data: Some(data),
        }
    }
}

/// Monotonic version of the shared dataset
///
/// Bumped atomically with every bulk replace or clear so clients can tell
/// their cached views are stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetVersion {
    pub version: i64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// A named, isolated dataset snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub session_name: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Bumped on every upload to this session
    pub version: i64,
    pub has_data: bool,
}

/// Outcome of a successful ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Transactions stored
    pub rows: usize,
    /// Rows dropped because the amount could not be parsed
    pub skipped: usize,
    /// Uncategorized rows assigned a category by the classifier
    pub classified: usize,
    /// Dataset version after the replace
    pub version: i64,
}
