//! Transaction command implementations

use anyhow::Result;
use kharcha_core::{db::Database, format_currency};

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.recent_transactions(limit)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  kharcha import --file statement.csv");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.amount < 0.0 {
            format!("\x1b[31m{}\x1b[0m", format_currency(tx.amount)) // Red for expenses
        } else {
            format!("\x1b[32m+{}\x1b[0m", format_currency(tx.amount)) // Green for income
        };

        println!(
            "   {} │ {:>14} │ {:<13} │ {}",
            tx.date,
            amount_str,
            tx.category,
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}
