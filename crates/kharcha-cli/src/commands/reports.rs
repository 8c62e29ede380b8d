//! Report command implementations (alerts, summary)

use anyhow::{Context, Result};
use kharcha_core::{
    db::Database, evaluate_budget_alerts, format_alert, format_currency, reference_date,
    resolve_time_window, summary,
};

pub fn cmd_alerts(db: &Database) -> Result<()> {
    let transactions = db.list_transactions(None)?;
    let budgets = db.budget_table()?;
    let reference = reference_date(&transactions);

    let alerts = evaluate_budget_alerts(&transactions, &budgets, reference);

    if alerts.is_empty() {
        println!("✅ No spending alerts! You're within your budgets.");
        return Ok(());
    }

    println!();
    println!("🚨 Spending Alerts ({})", reference.format("%B %Y"));
    println!("   ─────────────────────────────────────────────────────────────");
    for alert in &alerts {
        println!("   {}", format_alert(alert));
    }

    Ok(())
}

pub fn cmd_summary(db: &Database, period: Option<&str>, limit: usize) -> Result<()> {
    let transactions = db.list_transactions(None)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  kharcha import --file statement.csv");
        return Ok(());
    }

    let reference = reference_date(&transactions);
    let window = period
        .map(|p| {
            resolve_time_window(&p.replace('_', " "), reference)
                .with_context(|| format!("Unknown period: {}", p))
        })
        .transpose()?;

    let totals = summary::income_vs_expenses(&transactions);
    let version = db.dataset_version()?;

    println!();
    println!("📊 Spending Summary (dataset v{})", version.version);
    println!("   ─────────────────────────────────────");
    println!("   Income:    {:>16}", format_currency(totals.total_income));
    println!("   Expenses:  {:>16}", format_currency(totals.total_expenses));
    println!("   Net:       {:>16}", format_currency(totals.net_savings));

    println!();
    match window {
        Some(range) => println!("   By category ({})", range),
        None => println!("   By category"),
    }
    for point in summary::spending_by_category(&transactions, window) {
        println!("   {:<20} {:>14}", point.label, format_currency(point.value));
    }

    println!();
    println!("   Top merchants");
    for point in summary::top_merchants(&transactions, limit, window) {
        println!(
            "   {:<20} {:>14}",
            super::truncate(&point.label, 20),
            format_currency(point.value)
        );
    }

    Ok(())
}
