//! Session operations
//!
//! A session owns a private JSON snapshot of transactions. Uploading to a
//! session never touches the shared dataset or other sessions.

use rusqlite::{params, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Session, Transaction};

const DEFAULT_SESSION_NAME: &str = "Default Session";

const SELECT_SESSION: &str = "SELECT session_id, session_name, created_at, last_activity, version,
            transactions_json IS NOT NULL AND transactions_json != '[]'
     FROM sessions";

impl Database {
    /// Create an empty session with a random id
    pub fn create_session(&self, name: Option<&str>) -> Result<Session> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_SESSION_NAME);
        let session_id = Uuid::new_v4().to_string();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (session_id, session_name) VALUES (?, ?)",
            params![session_id, name],
        )?;
        info!(session_id = %session_id, name, "Session created");

        self.get_session(&session_id)?
            .ok_or_else(|| Error::NotFound(format!("Session {}", session_id)))
    }

    /// Sessions ordered by most recent activity
    pub fn list_sessions(&self) -> Result<Vec<Session>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY last_activity DESC, rowid DESC",
            SELECT_SESSION
        ))?;
        let sessions = stmt
            .query_map([], |row| Self::row_to_session(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                &format!("{} WHERE session_id = ?", SELECT_SESSION),
                params![session_id],
                |row| Self::row_to_session(row),
            )
            .optional()?;
        Ok(session)
    }

    /// Replace a session's snapshot and bump its version
    pub fn store_session_transactions(
        &self,
        session_id: &str,
        transactions: &[Transaction],
    ) -> Result<i64> {
        let json = serde_json::to_string(transactions)?;

        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE sessions SET transactions_json = ?, version = version + 1,
                    last_activity = CURRENT_TIMESTAMP
             WHERE session_id = ?",
            params![json, session_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Session {}", session_id)));
        }

        let version: i64 = conn.query_row(
            "SELECT version FROM sessions WHERE session_id = ?",
            params![session_id],
            |row| row.get(0),
        )?;
        info!(
            session_id,
            rows = transactions.len(),
            version,
            "Stored session snapshot"
        );
        Ok(version)
    }

    /// A session's snapshot (empty when nothing was uploaded yet)
    pub fn session_transactions(&self, session_id: &str) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let json: Option<Option<String>> = conn
            .query_row(
                "SELECT transactions_json FROM sessions WHERE session_id = ?",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            None => Err(Error::NotFound(format!("Session {}", session_id))),
            Some(None) => Ok(Vec::new()),
            Some(Some(json)) => Ok(serde_json::from_str(&json)?),
        }
    }

    /// Mark a session as used without changing its data
    pub fn touch_session(&self, session_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE sessions SET last_activity = CURRENT_TIMESTAMP WHERE session_id = ?",
            params![session_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Session {}", session_id)));
        }
        Ok(())
    }

    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM sessions WHERE session_id = ?",
            params![session_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Session {}", session_id)));
        }
        info!(session_id, "Session deleted");
        Ok(())
    }

    /// Column order: session_id, session_name, created_at, last_activity, version, has_data
    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
        let created_at: String = row.get(2)?;
        let last_activity: String = row.get(3)?;
        Ok(Session {
            session_id: row.get(0)?,
            session_name: row.get(1)?,
            created_at: parse_datetime(&created_at),
            last_activity: parse_datetime(&last_activity),
            version: row.get(4)?,
            has_data: row.get(5)?,
        })
    }
}
