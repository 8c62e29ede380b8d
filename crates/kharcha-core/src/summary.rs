//! Dashboard aggregations
//!
//! Pure functions over a transaction snapshot, so the shared dataset and
//! session snapshots are summarized the same way. Expense figures are
//! reported as positive magnitudes unless noted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DataPoint, Transaction};
use crate::period::DateRange;

/// Chart palette for category slices
pub const CHART_COLORS: [&str; 8] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#FF6384", "#C9CBCF",
];

/// Category pie chart series (expenses only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPie {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

/// Monthly expense and income series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub months: Vec<String>,
    pub expenses: Vec<f64>,
    pub income: Vec<f64>,
}

/// Bar chart series of merchants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantBars {
    pub labels: Vec<String>,
    pub amounts: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeVsExpenses {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
}

/// Headline figures for a dataset; expenses stay signed here
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthAmount {
    pub month: String,
    pub amount: f64,
}

/// Full analytics for one dataset (net amounts per category and month)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetAnalytics {
    pub summary: AnalyticsSummary,
    pub by_category: Vec<CategoryAmount>,
    pub by_month: Vec<MonthAmount>,
}

fn month_key(tx: &Transaction) -> String {
    tx.date.format("%Y-%m").to_string()
}

fn expenses<'a>(
    transactions: &'a [Transaction],
    range: Option<DateRange>,
) -> impl Iterator<Item = &'a Transaction> {
    transactions
        .iter()
        .filter(move |t| t.is_expense() && range.map_or(true, |r| r.contains(t.date)))
}

/// Sum expense magnitudes by a key
fn expense_totals<'a, F>(
    transactions: &'a [Transaction],
    range: Option<DateRange>,
    key: F,
) -> BTreeMap<&'a str, f64>
where
    F: Fn(&'a Transaction) -> &'a str,
{
    let mut totals = BTreeMap::new();
    for tx in expenses(transactions, range) {
        *totals.entry(key(tx)).or_insert(0.0) += tx.amount.abs();
    }
    totals
}

/// Largest first; equal values keep name order
fn ranked(totals: BTreeMap<&str, f64>) -> Vec<DataPoint> {
    let mut points: Vec<DataPoint> = totals
        .into_iter()
        .map(|(label, value)| DataPoint::new(label, value))
        .collect();
    points.sort_by(|a, b| b.value.total_cmp(&a.value));
    points
}

/// Expense per category, largest first
pub fn spending_by_category(
    transactions: &[Transaction],
    range: Option<DateRange>,
) -> Vec<DataPoint> {
    ranked(expense_totals(transactions, range, |t| t.category.as_str()))
}

/// Merchants by total expense, largest first
pub fn top_merchants(
    transactions: &[Transaction],
    limit: usize,
    range: Option<DateRange>,
) -> Vec<DataPoint> {
    let mut points = ranked(expense_totals(transactions, range, |t| t.merchant.as_str()));
    points.truncate(limit);
    points
}

/// Expense per calendar month (`YYYY-MM`), oldest first
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<DataPoint> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for tx in expenses(transactions, None) {
        *totals.entry(month_key(tx)).or_insert(0.0) += tx.amount.abs();
    }
    totals
        .into_iter()
        .map(|(month, value)| DataPoint::new(month, value))
        .collect()
}

pub fn category_pie(transactions: &[Transaction]) -> CategoryPie {
    let totals = expense_totals(transactions, None, |t| t.category.as_str());
    CategoryPie {
        labels: totals.keys().map(|k| k.to_string()).collect(),
        values: totals.values().copied().collect(),
        colors: CHART_COLORS.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn monthly_trend(transactions: &[Transaction]) -> MonthlyTrend {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for tx in transactions {
        let entry = months.entry(month_key(tx)).or_insert((0.0, 0.0));
        if tx.is_expense() {
            entry.0 += tx.amount.abs();
        } else if tx.is_income() {
            entry.1 += tx.amount;
        }
    }

    let mut trend = MonthlyTrend {
        months: Vec::with_capacity(months.len()),
        expenses: Vec::with_capacity(months.len()),
        income: Vec::with_capacity(months.len()),
    };
    for (month, (expense, income)) in months {
        trend.months.push(month);
        trend.expenses.push(expense);
        trend.income.push(income);
    }
    trend
}

pub fn top_merchants_by_total_spending(transactions: &[Transaction], limit: usize) -> MerchantBars {
    let points = top_merchants(transactions, limit, None);
    MerchantBars {
        labels: points.iter().map(|p| p.label.clone()).collect(),
        amounts: points.iter().map(|p| p.value).collect(),
    }
}

/// Largest individual payments, labelled `Merchant (DD-Mon)`
pub fn top_merchants_by_single_payment(transactions: &[Transaction], limit: usize) -> MerchantBars {
    let mut payments: Vec<&Transaction> = expenses(transactions, None).collect();
    payments.sort_by(|a, b| a.amount.total_cmp(&b.amount));
    payments.truncate(limit);

    MerchantBars {
        labels: payments
            .iter()
            .map(|t| format!("{} ({})", t.merchant, t.date.format("%d-%b")))
            .collect(),
        amounts: payments.iter().map(|t| t.amount.abs()).collect(),
    }
}

pub fn income_vs_expenses(transactions: &[Transaction]) -> IncomeVsExpenses {
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = expenses(transactions, None).map(|t| t.amount.abs()).sum();

    IncomeVsExpenses {
        total_income,
        total_expenses,
        net_savings: total_income - total_expenses,
    }
}

pub fn dataset_analytics(transactions: &[Transaction]) -> DatasetAnalytics {
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum();

    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions {
        *by_category.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
        *by_month.entry(month_key(tx)).or_insert(0.0) += tx.amount;
    }

    DatasetAnalytics {
        summary: AnalyticsSummary {
            total_income,
            total_expenses,
            net_balance: total_income + total_expenses,
            transaction_count: transactions.len(),
        },
        by_category: by_category
            .into_iter()
            .map(|(category, amount)| CategoryAmount {
                category: category.to_string(),
                amount,
            })
            .collect(),
        by_month: by_month
            .into_iter()
            .map(|(month, amount)| MonthAmount { month, amount })
            .collect(),
    }
}
