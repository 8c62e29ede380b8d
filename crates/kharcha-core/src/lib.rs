//! Kharcha Core Library
//!
//! Shared functionality for the Kharcha spending assistant:
//! - Category normalization and merchant extraction for imported rows
//! - Relative time windows anchored to the dataset's latest date
//! - Rule-based intent classification and query execution for chat questions
//! - Budget overspend alerts
//! - CSV ingestion with a statistical categorization fallback
//! - Dashboard aggregations
//! - Database access, migrations and isolated session snapshots

pub mod alerts;
pub mod categories;
pub mod classifier;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod import;
pub mod intent;
pub mod merchant;
pub mod models;
pub mod period;
pub mod query;
pub mod summary;

pub use alerts::{evaluate_budget_alerts, format_alert, BudgetLimit, BudgetTable};
pub use categories::{extract_category, normalize_category};
pub use classifier::CategoryClassifier;
pub use config::Config;
pub use currency::format_currency;
pub use db::Database;
pub use error::{Error, ImportError, Result};
pub use import::{ensure_csv_filename, import_csv, parse_csv, ImportTarget};
pub use intent::{classify_intent, parse_top_n, Intent};
pub use merchant::extract_merchant;
pub use models::*;
pub use period::{reference_date, resolve_time_window, DateRange};
pub use query::{answer, answer_with_config, QueryDescriptor};
