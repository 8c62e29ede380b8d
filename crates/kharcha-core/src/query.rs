//! Chat question answering
//!
//! A question is turned into a [`QueryDescriptor`] (intent, time window,
//! category, top-N) and executed against an in-memory transaction snapshot.
//! Answering is total: every question yields some text, never an error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alerts::{evaluate_budget_alerts, format_alert, BudgetTable};
use crate::categories::extract_category;
use crate::config::QueryConfig;
use crate::currency::format_currency;
use crate::intent::{classify_intent, parse_top_n, Intent};
use crate::models::{ChatAnswer, DataPoint, Transaction};
use crate::period::{current_month_range, resolve_time_window, DateRange};

pub const HELP_MESSAGE: &str =
    "I can help you analyze your spending. Try asking about specific categories or budgets.";
pub const NO_ALERTS_MESSAGE: &str = "No spending alerts! You're within your budgets.";
pub const NO_EXPENSES_MESSAGE: &str = "No expenses found for the given criteria.";
pub const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found.";

/// Structured form of a chat question, built fresh per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub intent: Intent,
    pub window: Option<DateRange>,
    pub category: Option<String>,
    pub top_n: usize,
}

impl QueryDescriptor {
    pub fn from_question(question: &str, reference: NaiveDate) -> Self {
        Self::from_question_with(question, reference, &QueryConfig::default())
    }

    pub fn from_question_with(question: &str, reference: NaiveDate, config: &QueryConfig) -> Self {
        let q = question.trim().to_lowercase();
        Self {
            intent: classify_intent(&q),
            window: resolve_time_window(&q, reference),
            category: extract_category(&q),
            top_n: parse_top_n(&q, config.default_top_n),
        }
    }

    /// Whether a transaction passes the window and category filters
    fn matches(&self, tx: &Transaction) -> bool {
        self.window.map_or(true, |w| w.contains(tx.date)) && self.matches_category(tx)
    }

    fn matches_category(&self, tx: &Transaction) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| tx.category.eq_ignore_ascii_case(c))
    }
}

/// Answer a question with default settings
pub fn answer(
    question: &str,
    reference: NaiveDate,
    transactions: &[Transaction],
    budgets: &BudgetTable,
) -> ChatAnswer {
    answer_with_config(
        question,
        reference,
        transactions,
        budgets,
        &QueryConfig::default(),
    )
}

/// Answer a question using configured defaults for top-N and list size
pub fn answer_with_config(
    question: &str,
    reference: NaiveDate,
    transactions: &[Transaction],
    budgets: &BudgetTable,
    config: &QueryConfig,
) -> ChatAnswer {
    let query = QueryDescriptor::from_question_with(question, reference, config);
    debug!(
        intent = %query.intent,
        category = ?query.category,
        window = ?query.window.map(|w| w.to_string()),
        "Resolved chat question"
    );
    execute(&query, reference, transactions, budgets, config)
}

/// Run a resolved query against a transaction snapshot
pub fn execute(
    query: &QueryDescriptor,
    reference: NaiveDate,
    transactions: &[Transaction],
    budgets: &BudgetTable,
    config: &QueryConfig,
) -> ChatAnswer {
    match query.intent {
        Intent::SumByCategory => sum_by_category(query, transactions),
        Intent::FastestGrowingCategory => fastest_growing_category(query, reference, transactions),
        Intent::TopExpenses => top_expenses(query, transactions),
        Intent::ListTransactions => list_transactions(query, transactions, config.list_limit),
        Intent::SpendingAlerts => spending_alerts(reference, transactions, budgets),
        Intent::Fallback => fallback(query, transactions),
    }
}

/// "earned" for a non-negative total, "spent" otherwise
fn verb_for(total: f64) -> &'static str {
    if total >= 0.0 {
        "earned"
    } else {
        "spent"
    }
}

fn sum_by_category(query: &QueryDescriptor, transactions: &[Transaction]) -> ChatAnswer {
    let total: f64 = transactions
        .iter()
        .filter(|t| query.matches(t))
        .map(|t| t.amount)
        .sum();

    let category = query.category.as_deref().unwrap_or_default();
    let range = query
        .window
        .map(|w| format!(" from {}", w))
        .unwrap_or_default();

    ChatAnswer::text(format!(
        "You {} {} on {}{}",
        verb_for(total),
        format_currency(total.abs()),
        category,
        range
    ))
}

fn top_expenses(query: &QueryDescriptor, transactions: &[Transaction]) -> ChatAnswer {
    let mut expenses: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.is_expense() && query.matches(t))
        .collect();

    // Stable sort keeps input order for equal amount and date
    expenses.sort_by(|a, b| {
        b.amount
            .abs()
            .total_cmp(&a.amount.abs())
            .then_with(|| b.date.cmp(&a.date))
    });
    expenses.truncate(query.top_n);

    if expenses.is_empty() {
        return ChatAnswer::text(NO_EXPENSES_MESSAGE);
    }

    let data: Vec<DataPoint> = expenses
        .iter()
        .map(|t| {
            DataPoint::new(
                format!("{} - {}: {}", t.date, t.merchant, format_currency(t.amount)),
                t.amount,
            )
        })
        .collect();

    ChatAnswer::with_data(format!("Here are your top {} expenses:", data.len()), data)
}

fn list_transactions(
    query: &QueryDescriptor,
    transactions: &[Transaction],
    limit: usize,
) -> ChatAnswer {
    // Newest date first; among equal dates the later-inserted row comes first
    let mut rows: Vec<(usize, &Transaction)> = transactions
        .iter()
        .enumerate()
        .filter(|(_, t)| query.matches(t))
        .collect();
    rows.sort_by(|(ia, a), (ib, b)| b.date.cmp(&a.date).then_with(|| ib.cmp(ia)));
    rows.truncate(limit);

    if rows.is_empty() {
        return ChatAnswer::text(NO_TRANSACTIONS_MESSAGE);
    }

    let data = rows
        .iter()
        .map(|(_, t)| {
            DataPoint::new(
                format!(
                    "{} - {}: {} ({})",
                    t.date,
                    t.merchant,
                    format_currency(t.amount),
                    t.category
                ),
                t.amount,
            )
        })
        .collect();

    ChatAnswer::with_data("Recent transactions:", data)
}

fn spending_alerts(
    reference: NaiveDate,
    transactions: &[Transaction],
    budgets: &BudgetTable,
) -> ChatAnswer {
    let alerts = evaluate_budget_alerts(transactions, budgets, reference);
    if alerts.is_empty() {
        return ChatAnswer::text(NO_ALERTS_MESSAGE);
    }

    let lines: Vec<String> = alerts.iter().map(format_alert).collect();
    ChatAnswer::text(format!("Spending Alerts:\n{}", lines.join("\n")))
}

/// Expense magnitude per category inside a window
fn expense_by_category<'a>(
    query: &QueryDescriptor,
    transactions: &'a [Transaction],
    window: DateRange,
) -> BTreeMap<&'a str, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.is_expense() && window.contains(t.date) && query.matches_category(t))
    {
        *totals.entry(tx.category.as_str()).or_insert(0.0) += tx.amount.abs();
    }
    totals
}

/// Compare per-category spend in the asked-about window against the window before it
fn fastest_growing_category(
    query: &QueryDescriptor,
    reference: NaiveDate,
    transactions: &[Transaction],
) -> ChatAnswer {
    let current = query
        .window
        .unwrap_or_else(|| current_month_range(reference));
    let prior = current.previous_period();

    let now = expense_by_category(query, transactions, current);
    let before = expense_by_category(query, transactions, prior);

    let mut growth: Vec<(&str, f64, f64)> = now
        .iter()
        .map(|(category, &spent)| {
            let previous = before.get(category).copied().unwrap_or(0.0);
            (*category, previous, spent)
        })
        .filter(|(_, previous, spent)| spent - previous > 0.0)
        .collect();

    // Largest increase first; BTreeMap order already breaks ties by name
    growth.sort_by(|a, b| (b.2 - b.1).total_cmp(&(a.2 - a.1)));

    let Some(&(top, previous, spent)) = growth.first() else {
        return ChatAnswer::text(format!(
            "No category spending increased between {} and {}.",
            prior, current
        ));
    };

    let change = if previous > 0.0 {
        format!("+{:.1}%", (spent - previous) / previous * 100.0)
    } else {
        "new".to_string()
    };

    let data = growth
        .iter()
        .map(|(category, previous, spent)| {
            DataPoint::new(
                format!(
                    "{}: {} → {}",
                    category,
                    format_currency(*previous),
                    format_currency(*spent)
                ),
                spent - previous,
            )
        })
        .collect();

    ChatAnswer::with_data(
        format!(
            "{} is your fastest growing category: {} → {} ({}) comparing {} with {}",
            top,
            format_currency(previous),
            format_currency(spent),
            change,
            prior,
            current
        ),
        data,
    )
}

fn fallback(query: &QueryDescriptor, transactions: &[Transaction]) -> ChatAnswer {
    let Some(category) = query.category.as_deref() else {
        return ChatAnswer::text(HELP_MESSAGE);
    };

    // All-time total: the time window does not apply here
    let total: f64 = transactions
        .iter()
        .filter(|t| query.matches_category(t))
        .map(|t| t.amount)
        .sum();

    ChatAnswer::text(format!(
        "You {} {} on {} overall.",
        verb_for(total),
        format_currency(total.abs()),
        category
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tx(date: NaiveDate, merchant: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            date,
            description: merchant.to_string(),
            merchant: merchant.to_string(),
            amount,
            category: category.to_string(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(d(2024, 1, 5), "Swiggy Order", -500.0, "Food"),
            tx(d(2024, 1, 10), "Uber Trip", -1200.0, "Transport"),
            tx(d(2024, 1, 12), "Zomato", -250.0, "Food"),
            tx(d(2024, 1, 20), "Acme Salary", 50000.0, "Income"),
            tx(d(2023, 12, 15), "Dominos", -800.0, "Food"),
            tx(d(2023, 12, 20), "Amazon", -3000.0, "Shopping"),
        ]
    }

    fn ask(question: &str, txs: &[Transaction]) -> ChatAnswer {
        answer(question, d(2024, 1, 20), txs, &BudgetTable::new())
    }

    #[test]
    fn test_descriptor() {
        let q = QueryDescriptor::from_question("  Top 5 FOOD expenses last month ", d(2024, 1, 20));
        assert_eq!(q.intent, Intent::SumByCategory);
        assert_eq!(q.category.as_deref(), Some("Food"));
        assert_eq!(q.window, Some(DateRange::new(d(2023, 12, 1), d(2023, 12, 31))));
        assert_eq!(q.top_n, 5);
    }

    #[test]
    fn test_sum_by_category_all_time() {
        let a = ask("how much did I spend on food", &sample());
        assert_eq!(a.answer, "You spent ₹1,550.00 on Food");
        assert!(a.data.is_none());
    }

    #[test]
    fn test_sum_by_category_with_window() {
        let a = ask("how much did I spend on food this month", &sample());
        assert_eq!(
            a.answer,
            "You spent ₹750.00 on Food from 2024-01-01 to 2024-01-31"
        );
    }

    #[test]
    fn test_sum_by_category_income_is_earned() {
        let a = ask("total salary income", &sample());
        assert_eq!(a.answer, "You earned ₹50,000.00 on Income");
    }

    #[test]
    fn test_sum_by_category_empty_is_zero_earned() {
        let a = ask("how much did I spend on education", &sample());
        assert_eq!(a.answer, "You earned ₹0.00 on Education");
    }

    #[test]
    fn test_sum_category_match_is_case_insensitive() {
        let txs = vec![tx(d(2024, 1, 5), "Cafe", -100.0, "FOOD")];
        let a = ask("how much on food", &txs);
        assert_eq!(a.answer, "You spent ₹100.00 on Food");
    }

    #[test]
    fn test_top_expenses() {
        let a = ask("show my top 2 expenses", &sample());
        assert_eq!(a.answer, "Here are your top 2 expenses:");
        let data = a.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].label, "2023-12-20 - Amazon: -₹3,000.00");
        assert_eq!(data[0].value, -3000.0);
        assert_eq!(data[1].label, "2024-01-10 - Uber Trip: -₹1,200.00");
    }

    #[test]
    fn test_top_expenses_reports_actual_count() {
        let txs = vec![tx(d(2024, 1, 5), "Cafe", -100.0, "Food")];
        let a = ask("biggest expense", &txs);
        assert_eq!(a.answer, "Here are your top 1 expenses:");
    }

    #[test]
    fn test_top_expenses_tie_break() {
        let txs = vec![
            tx(d(2024, 1, 1), "First", -100.0, "Food"),
            tx(d(2024, 1, 3), "Newer", -100.0, "Food"),
            tx(d(2024, 1, 1), "Second", -100.0, "Food"),
        ];
        let data = ask("top 3 expenses", &txs).data.unwrap();
        let merchants: Vec<&str> = data
            .iter()
            .map(|p| p.label.split(" - ").nth(1).unwrap().split(':').next().unwrap())
            .collect();
        assert_eq!(merchants, vec!["Newer", "First", "Second"]);
    }

    #[test]
    fn test_top_expenses_none() {
        let txs = vec![tx(d(2024, 1, 20), "Acme", 100.0, "Income")];
        let a = ask("highest expense", &txs);
        assert_eq!(a.answer, NO_EXPENSES_MESSAGE);
        assert!(a.data.is_none());
    }

    #[test]
    fn test_list_transactions() {
        let a = ask("list my transactions", &sample());
        assert_eq!(a.answer, "Recent transactions:");
        let data = a.data.unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(data[0].label, "2024-01-20 - Acme Salary: ₹50,000.00 (Income)");
        assert_eq!(data[5].label, "2023-12-15 - Dominos: -₹800.00 (Food)");
    }

    #[test]
    fn test_list_limit_and_same_day_order() {
        let txs: Vec<Transaction> = (0..15)
            .map(|i| tx(d(2024, 1, 1), &format!("M{}", i), -1.0, "Food"))
            .collect();
        let data = ask("list everything", &txs).data.unwrap();
        assert_eq!(data.len(), 10);
        assert!(data[0].label.contains("M14"));
        assert!(data[9].label.contains("M5"));
    }

    #[test]
    fn test_list_with_window() {
        let a = ask("show transactions last month", &sample());
        assert_eq!(a.data.unwrap().len(), 2);
    }

    #[test]
    fn test_list_empty() {
        let a = ask("list my transactions", &[]);
        assert_eq!(a.answer, NO_TRANSACTIONS_MESSAGE);
    }

    #[test]
    fn test_spending_alerts() {
        let mut budgets = BudgetTable::new();
        budgets.insert("Food", 400.0, true);
        budgets.insert("Transport", 5000.0, true);

        let a = answer("any alerts?", d(2024, 1, 20), &sample(), &budgets);
        assert_eq!(
            a.answer,
            "Spending Alerts:\nFood: Budget ₹400.00, Spent -₹750.00, Overspent by ₹350.00 (87.5%)"
        );
    }

    #[test]
    fn test_no_alerts() {
        let a = ask("am I over my limit", &sample());
        assert_eq!(a.answer, NO_ALERTS_MESSAGE);
    }

    #[test]
    fn test_fastest_growing_category() {
        let txs = vec![
            tx(d(2023, 12, 5), "Cafe", -100.0, "Food"),
            tx(d(2023, 12, 6), "Mall", -1000.0, "Shopping"),
            tx(d(2024, 1, 5), "Cafe", -300.0, "Food"),
            tx(d(2024, 1, 6), "Mall", -1100.0, "Shopping"),
            tx(d(2024, 1, 7), "Gym", -50.0, "Health"),
        ];
        let a = ask("which category is growing", &txs);
        assert_eq!(
            a.answer,
            "Food is your fastest growing category: ₹100.00 → ₹300.00 (+200.0%) \
             comparing 2023-12-01 to 2023-12-31 with 2024-01-01 to 2024-01-31"
        );
        let data = a.data.unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].value, 200.0);
        assert_eq!(data[1].label, "Shopping: ₹1,000.00 → ₹1,100.00");
        assert_eq!(data[2].label, "Health: ₹0.00 → ₹50.00");
    }

    #[test]
    fn test_fastest_growing_new_category() {
        let txs = vec![tx(d(2024, 1, 5), "Gym", -50.0, "Health")];
        let a = ask("spending trend", &txs);
        assert!(a.answer.starts_with("Health is your fastest growing category"));
        assert!(a.answer.contains("(new)"));
    }

    #[test]
    fn test_fastest_growing_none() {
        let txs = vec![
            tx(d(2023, 12, 5), "Cafe", -300.0, "Food"),
            tx(d(2024, 1, 5), "Cafe", -100.0, "Food"),
        ];
        let a = ask("any increase?", &txs);
        assert_eq!(
            a.answer,
            "No category spending increased between 2023-12-01 to 2023-12-31 and 2024-01-01 to 2024-01-31."
        );
    }

    #[test]
    fn test_fastest_growing_weekly_window() {
        // 2024-01-20 is a Saturday; this week = Jan 15-21, prior = Jan 8-14
        let txs = vec![
            tx(d(2024, 1, 10), "Cafe", -100.0, "Food"),
            tx(d(2024, 1, 16), "Cafe", -150.0, "Food"),
        ];
        let a = ask("what increased this week", &txs);
        assert!(a.answer.contains("(+50.0%)"));
    }

    #[test]
    fn test_fallback_with_category_ignores_window() {
        let a = ask("food last month?", &sample());
        assert_eq!(a.answer, "You spent ₹1,550.00 on Food overall.");
    }

    #[test]
    fn test_fallback_help() {
        let a = ask("hello", &sample());
        assert_eq!(a.answer, HELP_MESSAGE);
        assert!(a.data.is_none());
    }

    #[test]
    fn test_config_list_limit() {
        let config = QueryConfig {
            default_top_n: 1,
            list_limit: 2,
        };
        let txs = sample();
        let reference = d(2024, 1, 20);
        let budgets = BudgetTable::new();

        let listed = answer_with_config("list all", reference, &txs, &budgets, &config);
        assert_eq!(listed.data.unwrap().len(), 2);

        let top = answer_with_config("biggest expenses", reference, &txs, &budgets, &config);
        assert_eq!(top.data.unwrap().len(), 1);
    }
}
