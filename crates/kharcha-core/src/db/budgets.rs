//! Budget operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::Database;
use crate::alerts::BudgetTable;
use crate::error::{Error, Result};
use crate::models::Budget;

impl Database {
    /// Create or update a category budget
    ///
    /// Updating an inactive budget re-activates it. Negative or non-finite
    /// amounts are rejected.
    pub fn set_budget(&self, category: &str, monthly_budget: f64) -> Result<Budget> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::InvalidData("Budget category cannot be empty".into()));
        }
        if !monthly_budget.is_finite() || monthly_budget < 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget must be a non-negative amount, got {}",
                monthly_budget
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (category, monthly_budget, is_active)
            VALUES (?, ?, 1)
            ON CONFLICT(category) DO UPDATE SET
                monthly_budget = excluded.monthly_budget,
                is_active = 1,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![category, monthly_budget],
        )?;

        info!(category, monthly_budget, "Budget set");
        Ok(Budget {
            category: category.to_string(),
            monthly_budget,
            is_active: true,
        })
    }

    /// Active budgets ordered by category
    pub fn list_budgets(&self) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, monthly_budget, is_active FROM budgets
             WHERE is_active = 1 ORDER BY category",
        )?;
        let budgets = stmt
            .query_map([], |row| Self::row_to_budget(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    /// Look up a budget regardless of its active flag
    pub fn get_budget(&self, category: &str) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT category, monthly_budget, is_active FROM budgets WHERE category = ?",
                params![category],
                |row| Self::row_to_budget(row),
            )
            .optional()?;
        Ok(budget)
    }

    /// Stop alerting on a category without forgetting its amount
    ///
    /// Returns `NotFound` when no active budget exists for the category.
    pub fn deactivate_budget(&self, category: &str) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE budgets SET is_active = 0, updated_at = CURRENT_TIMESTAMP
             WHERE category = ? AND is_active = 1",
            params![category],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("No active budget for {}", category)));
        }
        info!(category, "Budget deactivated");
        Ok(())
    }

    /// Every stored budget (active or not) keyed by category, for alerting
    pub fn budget_table(&self) -> Result<BudgetTable> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT category, monthly_budget, is_active FROM budgets")?;
        let budgets = stmt
            .query_map([], |row| Self::row_to_budget(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(BudgetTable::from(budgets.as_slice()))
    }

    fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        Ok(Budget {
            category: row.get(0)?,
            monthly_budget: row.get(1)?,
            is_active: row.get(2)?,
        })
    }
}
