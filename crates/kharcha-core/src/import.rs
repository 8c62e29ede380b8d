//! CSV ingestion
//!
//! Uploads carry `date, description, amount, category` columns (any order,
//! header names trimmed and case-insensitive, extra columns ignored). Each row
//! is normalized on the way in:
//! - dates accept `DD-MM-YYYY`, `YYYY-MM-DD`, `MM-DD-YYYY` or `DD-MM-YY`
//! - categories go through the alias table
//! - merchants are derived from the description
//!
//! Rows still `Uncategorized` afterwards are offered to the statistical
//! classifier before the dataset is stored.

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::categories::normalize_category;
use crate::classifier::{classify_uncategorized, CategoryClassifier};
use crate::config::ClassifierConfig;
use crate::db::Database;
use crate::error::ImportError;
use crate::merchant::extract_merchant;
use crate::models::{ImportReport, Transaction, UNCATEGORIZED};
use crate::period::today;

/// Columns every upload must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "description", "amount", "category"];

/// Date layouts tried in order after `/` is rewritten to `-`
///
/// Each entry also says where the year sits and how many digits it must have,
/// since `%Y` alone would accept a two-digit year.
const DATE_FORMATS: [(&str, YearField); 4] = [
    ("%d-%m-%Y", YearField::Last(4)),
    ("%Y-%m-%d", YearField::First(4)),
    ("%m-%d-%Y", YearField::Last(4)),
    ("%d-%m-%y", YearField::Last(2)),
];

#[derive(Debug, Clone, Copy)]
enum YearField {
    First(usize),
    Last(usize),
}

/// Where an upload should be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget<'a> {
    /// Replace the shared dataset
    Shared,
    /// Replace one session's private snapshot
    Session(&'a str),
}

/// Rows parsed from an upload
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub transactions: Vec<Transaction>,
    /// Rows dropped because the amount was not a number
    pub skipped: usize,
}

/// Reject uploads whose file name doesn't end in `.csv`
pub fn ensure_csv_filename(filename: &str) -> std::result::Result<(), ImportError> {
    if filename.to_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(ImportError::NotCsv {
            filename: filename.to_string(),
        })
    }
}

/// Parse an upload into normalized transactions
pub fn parse_csv<R: Read>(reader: R) -> std::result::Result<ParsedCsv, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();
    let columns = ColumnIndex::from_headers(&headers)?;
    debug!(?headers, "CSV columns");

    let mut parsed = ParsedCsv::default();
    for result in rdr.records() {
        let record = result?;
        match columns.transaction(&record) {
            Some(tx) => parsed.transactions.push(tx),
            None => parsed.skipped += 1,
        }
    }

    debug!(
        rows = parsed.transactions.len(),
        skipped = parsed.skipped,
        "Parsed CSV"
    );
    Ok(parsed)
}

/// Positions of the required columns in a header row
struct ColumnIndex {
    date: usize,
    description: usize,
    amount: usize,
    category: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> std::result::Result<Self, ImportError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        match (
            find("date"),
            find("description"),
            find("amount"),
            find("category"),
        ) {
            (Some(date), Some(description), Some(amount), Some(category)) => Ok(Self {
                date,
                description,
                amount,
                category,
            }),
            _ => Err(ImportError::MissingColumns {
                expected: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
                found: headers.to_vec(),
            }),
        }
    }

    /// Build a transaction, or `None` when the amount is unusable
    fn transaction(&self, record: &StringRecord) -> Option<Transaction> {
        let field = |i: usize| record.get(i).unwrap_or("");

        let amount = parse_amount(field(self.amount))?;
        let description = field(self.description).to_string();

        Some(Transaction {
            date: parse_csv_date(field(self.date)),
            merchant: extract_merchant(&description),
            description,
            amount,
            category: normalize_category(field(self.category)),
        })
    }
}

/// Parse an upload date, falling back to today when no format matches
pub fn parse_csv_date(s: &str) -> NaiveDate {
    match try_parse_csv_date(s) {
        Some(date) => date,
        None => {
            warn!("Unable to parse date '{}', using today's date", s.trim());
            today()
        }
    }
}

/// Parse an upload date without a fallback
pub fn try_parse_csv_date(s: &str) -> Option<NaiveDate> {
    let normalized = s.trim().replace('/', "-");
    let parts: Vec<&str> = normalized.split('-').collect();
    if parts.len() != 3 {
        return None;
    }

    DATE_FORMATS.iter().find_map(|(fmt, year)| {
        let year_len = match year {
            YearField::First(n) => parts[0].len() == *n,
            YearField::Last(n) => parts[2].len() == *n,
        };
        if !year_len {
            return None;
        }
        NaiveDate::parse_from_str(&normalized, fmt).ok()
    })
}

/// Parse an amount, tolerating currency symbols, thousands separators and
/// accounting-style parentheses
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['₹', '$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

/// Parse, classify and store an upload
///
/// The classifier learns from categorized rows already in the shared dataset
/// plus the categorized rows of the upload itself.
pub fn import_csv<R: Read>(
    db: &Database,
    reader: R,
    target: ImportTarget<'_>,
    config: &ClassifierConfig,
) -> std::result::Result<ImportReport, ImportError> {
    let ParsedCsv {
        mut transactions,
        skipped,
    } = parse_csv(reader)?;

    if transactions.is_empty() {
        return Err(ImportError::Empty);
    }

    let classified = classify_fallback(db, &mut transactions, config)?;

    let stored = match target {
        ImportTarget::Shared => db.replace_transactions(&transactions),
        ImportTarget::Session(id) => db.store_session_transactions(id, &transactions),
    };
    let version = stored.map_err(|e| ImportError::Storage(e.to_string()))?;

    info!(
        rows = transactions.len(),
        skipped,
        classified,
        version,
        ?target,
        "Import complete"
    );

    Ok(ImportReport {
        rows: transactions.len(),
        skipped,
        classified,
        version,
    })
}

fn classify_fallback(
    db: &Database,
    transactions: &mut [Transaction],
    config: &ClassifierConfig,
) -> std::result::Result<usize, ImportError> {
    if !config.enabled || !transactions.iter().any(|t| t.category == UNCATEGORIZED) {
        return Ok(0);
    }

    let stored = db
        .list_transactions(None)
        .map_err(|e| ImportError::Storage(e.to_string()))?;

    let Some(classifier) =
        CategoryClassifier::from_transactions(stored.iter().chain(transactions.iter()), config)
    else {
        return Ok(0);
    };

    let changed = classify_uncategorized(transactions, &classifier);
    debug!(changed, "Classifier filled uncategorized rows");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_csv_date_formats() {
        assert_eq!(try_parse_csv_date("15-01-2024"), Some(d(2024, 1, 15)));
        assert_eq!(try_parse_csv_date("15/01/2024"), Some(d(2024, 1, 15)));
        assert_eq!(try_parse_csv_date("2024-01-15"), Some(d(2024, 1, 15)));
        assert_eq!(try_parse_csv_date("2024/01/15"), Some(d(2024, 1, 15)));
        assert_eq!(try_parse_csv_date("15-01-24"), Some(d(2024, 1, 15)));
    }

    #[test]
    fn test_parse_csv_date_day_first_wins() {
        // Ambiguous dates are read day-first
        assert_eq!(try_parse_csv_date("01-04-2024"), Some(d(2024, 4, 1)));
        // Only valid month-first
        assert_eq!(try_parse_csv_date("04-25-2024"), Some(d(2024, 4, 25)));
    }

    #[test]
    fn test_parse_csv_date_fallback() {
        assert_eq!(try_parse_csv_date("not a date"), None);
        assert_eq!(try_parse_csv_date("2024-13-45"), None);
        assert_eq!(try_parse_csv_date("1-1-1"), None);
        assert_eq!(parse_csv_date("garbage"), today());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-₹500"), Some(-500.0));
        assert_eq!(parse_amount("$12"), Some(12.0));
        assert_eq!(parse_amount("(100.00)"), Some(-100.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_ensure_csv_filename() {
        assert!(ensure_csv_filename("statement.csv").is_ok());
        assert!(ensure_csv_filename("STATEMENT.CSV").is_ok());
        let err = ensure_csv_filename("statement.xlsx").unwrap_err();
        assert_eq!(err.reason(), "not_csv");
    }

    #[test]
    fn test_parse_csv_normalizes_rows() {
        let csv = " Date ,Description,AMOUNT,Category,Notes
15-01-2024,SWIGGY ORDER 123,-450.50,groceries,x
16/01/2024,Uber Ride Office,-230,,
2024-01-20,ACME CORP SALARY,50000,Salary,";

        let parsed = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.skipped, 0);
        let txs = parsed.transactions;
        assert_eq!(txs.len(), 3);

        assert_eq!(txs[0].date, d(2024, 1, 15));
        assert_eq!(txs[0].merchant, "Swiggy Order");
        assert_eq!(txs[0].category, "Food");
        assert_eq!(txs[0].amount, -450.5);

        assert_eq!(txs[1].category, UNCATEGORIZED);
        assert_eq!(txs[1].merchant, "Uber Ride");

        assert_eq!(txs[2].category, "Income");
        assert_eq!(txs[2].description, "ACME CORP SALARY");
    }

    #[test]
    fn test_parse_csv_skips_bad_amounts() {
        let csv = "date,description,amount,category
15-01-2024,Coffee,abc,Food
16-01-2024,Tea,-20,Food";

        let parsed = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_parse_csv_missing_columns() {
        let csv = "date,narration,amount\n15-01-2024,Coffee,-20";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.reason(), "missing_columns");
        assert_eq!(
            err.to_string(),
            "CSV must have columns: date, description, amount, category. Found: date, narration, amount"
        );
    }

    #[test]
    fn test_import_empty_upload() {
        let db = Database::in_memory().unwrap();
        let csv = "date,description,amount,category\n";
        let err = import_csv(
            &db,
            csv.as_bytes(),
            ImportTarget::Shared,
            &ClassifierConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.reason(), "empty");
    }

    #[test]
    fn test_import_replaces_shared_dataset() {
        let db = Database::in_memory().unwrap();
        let config = ClassifierConfig::default();

        let first = "date,description,amount,category\n01-01-2024,A,-1,Food\n02-01-2024,B,-2,Food";
        let report = import_csv(&db, first.as_bytes(), ImportTarget::Shared, &config).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.version, 1);

        let second = "date,description,amount,category\n03-01-2024,C,-3,Bills";
        let report = import_csv(&db, second.as_bytes(), ImportTarget::Shared, &config).unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.version, 2);

        let stored = db.list_transactions(None).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].category, "Bills");
    }

    #[test]
    fn test_import_classifies_uncategorized() {
        let db = Database::in_memory().unwrap();
        let mut csv = String::from("date,description,amount,category\n");
        for i in 0..6 {
            csv.push_str(&format!("0{}-01-2024,Swiggy dinner order,-{}00,Food\n", i + 1, i + 1));
            csv.push_str(&format!("0{}-01-2024,Metro card topup,-{}0,Transport\n", i + 1, i + 1));
        }
        csv.push_str("09-01-2024,Swiggy dinner,-300,\n");

        let report = import_csv(
            &db,
            csv.as_bytes(),
            ImportTarget::Shared,
            &ClassifierConfig::default(),
        )
        .unwrap();
        assert_eq!(report.rows, 13);
        assert_eq!(report.classified, 1);

        let stored = db.list_transactions(None).unwrap();
        assert_eq!(stored[12].category, "Food");
    }

    #[test]
    fn test_import_classifier_disabled() {
        let db = Database::in_memory().unwrap();
        let config = ClassifierConfig {
            enabled: false,
            ..Default::default()
        };
        let csv = "date,description,amount,category\n01-01-2024,Mystery,-1,";
        let report = import_csv(&db, csv.as_bytes(), ImportTarget::Shared, &config).unwrap();
        assert_eq!(report.classified, 0);
        assert_eq!(db.list_transactions(None).unwrap()[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_import_to_unknown_session() {
        let db = Database::in_memory().unwrap();
        let csv = "date,description,amount,category\n01-01-2024,A,-1,Food";
        let err = import_csv(
            &db,
            csv.as_bytes(),
            ImportTarget::Session("missing"),
            &ClassifierConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.reason(), "storage");
    }
}
