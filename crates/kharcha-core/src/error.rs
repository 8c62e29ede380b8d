//! Error types for Kharcha

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why an ingestion attempt was rejected
///
/// Returned by the import pipeline instead of swallowing failures, so callers
/// can report a stable `reason()` code alongside the human-readable message.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Please upload a CSV file (got {filename})")]
    NotCsv { filename: String },

    #[error("CSV must have columns: {}. Found: {}", .expected.join(", "), .found.join(", "))]
    MissingColumns {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Malformed CSV: {0}")]
    Malformed(String),

    #[error("CSV contained no usable rows")]
    Empty,

    #[error("Failed to store transactions: {0}")]
    Storage(String),
}

impl ImportError {
    /// Stable machine-readable code for API responses
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotCsv { .. } => "not_csv",
            Self::MissingColumns { .. } => "missing_columns",
            Self::Malformed(_) => "malformed",
            Self::Empty => "empty",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
