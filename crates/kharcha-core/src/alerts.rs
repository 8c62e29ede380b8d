//! Budget overspend evaluation
//!
//! Spend is measured over the calendar month containing the reference date.
//! Callers pass the dataset's latest transaction date as the reference, the
//! same anchor used for relative time phrases in chat questions.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::currency::format_currency;
use crate::models::{Budget, SpendingAlert, Transaction};
use crate::period::current_month_range;

/// Monthly limit and active flag for one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub monthly_budget: f64,
    pub is_active: bool,
}

/// Category → budget mapping used for alerting
///
/// Keys are matched case-sensitively against transaction categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetTable {
    limits: HashMap<String, BudgetLimit>,
}

impl BudgetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, monthly_budget: f64, is_active: bool) {
        self.limits.insert(
            category.into(),
            BudgetLimit {
                monthly_budget,
                is_active,
            },
        );
    }

    /// Active limit for a category, if any
    pub fn active_limit(&self, category: &str) -> Option<f64> {
        self.limits
            .get(category)
            .filter(|limit| limit.is_active)
            .map(|limit| limit.monthly_budget)
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl From<&[Budget]> for BudgetTable {
    fn from(budgets: &[Budget]) -> Self {
        let mut table = Self::new();
        for b in budgets {
            table.insert(b.category.clone(), b.monthly_budget, b.is_active);
        }
        table
    }
}

/// Compare this month's spend per category against active budgets
///
/// Alerts are returned sorted by category name. A zero budget with any spend
/// is reported with an undefined percentage rather than dividing by zero.
pub fn evaluate_budget_alerts(
    transactions: &[Transaction],
    budgets: &BudgetTable,
    reference: NaiveDate,
) -> Vec<SpendingAlert> {
    let month = current_month_range(reference);

    let mut spend_by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.is_expense() && month.contains(t.date))
    {
        *spend_by_category.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
    }

    let mut alerts = Vec::new();
    for (category, total) in spend_by_category {
        let Some(budget) = budgets.active_limit(category) else {
            continue;
        };
        let spent = total.abs();
        if spent <= budget {
            continue;
        }

        let overspend_amount = spent - budget;
        let overspend_percent = if budget > 0.0 {
            Some(overspend_amount / budget * 100.0)
        } else {
            None
        };

        alerts.push(SpendingAlert {
            category: category.to_string(),
            budget,
            spent,
            overspend_amount,
            overspend_percent,
        });
    }

    debug!(
        month = %month,
        alerts = alerts.len(),
        "Evaluated budget alerts"
    );
    alerts
}

/// One-line summary of an alert
pub fn format_alert(alert: &SpendingAlert) -> String {
    let percent = match alert.overspend_percent {
        Some(p) => format!("{:.1}%", p),
        None => "n/a".to_string(),
    };
    format!(
        "{}: Budget {}, Spent {}, Overspent by {} ({})",
        alert.category,
        format_currency(alert.budget),
        format_currency(-alert.spent),
        format_currency(alert.overspend_amount),
        percent
    )
}
