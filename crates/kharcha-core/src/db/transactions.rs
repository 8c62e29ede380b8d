//! Shared dataset operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{DatasetVersion, Transaction};

const SELECT_COLUMNS: &str = "SELECT date, description, merchant, amount, category FROM transactions";

impl Database {
    /// Replace the whole shared dataset and bump its version
    ///
    /// Delete, insert and version bump commit together, so readers see either
    /// the old dataset or the new one.
    pub fn replace_transactions(&self, transactions: &[Transaction]) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute("DELETE FROM transactions", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (date, description, merchant, amount, category)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for t in transactions {
                stmt.execute(params![
                    t.date.to_string(),
                    t.description,
                    t.merchant,
                    t.amount,
                    t.category,
                ])?;
            }
        }
        let version = bump_version(&tx)?;
        tx.commit()?;

        info!(
            deleted,
            inserted = transactions.len(),
            version,
            "Replaced shared dataset"
        );
        Ok(version)
    }

    /// Delete every shared transaction (administrative reset)
    ///
    /// Returns the number of rows removed and the new version.
    pub fn clear_transactions(&self) -> Result<(usize, i64)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM transactions", [])?;
        let version = bump_version(&tx)?;
        tx.commit()?;

        info!(deleted, version, "Cleared shared dataset");
        Ok((deleted, version))
    }

    /// All shared transactions in insertion order, optionally limited
    pub fn list_transactions(&self, limit: Option<i64>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id LIMIT ?", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map(params![limit.unwrap_or(-1)], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Newest transactions first; later-inserted rows win ties on date
    pub fn recent_transactions(&self, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY date DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit], |row| Self::row_to_transaction(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Latest transaction date in the shared dataset
    pub fn latest_transaction_date(&self) -> Result<Option<NaiveDate>> {
        let conn = self.conn()?;
        let latest: Option<String> =
            conn.query_row("SELECT MAX(date) FROM transactions", [], |row| row.get(0))?;
        Ok(latest.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
    }

    /// Count shared transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Current version of the shared dataset
    pub fn dataset_version(&self) -> Result<DatasetVersion> {
        let conn = self.conn()?;
        let meta = conn
            .query_row(
                "SELECT version, refreshed_at FROM dataset_meta WHERE id = 1",
                [],
                |row| {
                    let refreshed: Option<String> = row.get(1)?;
                    Ok(DatasetVersion {
                        version: row.get(0)?,
                        refreshed_at: refreshed.map(|s| parse_datetime(&s)),
                    })
                },
            )
            .optional()?;
        Ok(meta.unwrap_or_default())
    }

    /// Column order: date, description, merchant, amount, category
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(0)?;
        Ok(Transaction {
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            description: row.get(1)?,
            merchant: row.get(2)?,
            amount: row.get(3)?,
            category: row.get(4)?,
        })
    }
}

fn bump_version(tx: &rusqlite::Transaction<'_>) -> rusqlite::Result<i64> {
    tx.execute(
        "UPDATE dataset_meta SET version = version + 1, refreshed_at = CURRENT_TIMESTAMP WHERE id = 1",
        [],
    )?;
    tx.query_row("SELECT version FROM dataset_meta WHERE id = 1", [], |row| {
        row.get(0)
    })
}
