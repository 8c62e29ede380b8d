//! Budget command implementations

use anyhow::Result;
use kharcha_core::{db::Database, format_currency};

pub fn cmd_budgets_list(db: &Database) -> Result<()> {
    let budgets = db.list_budgets()?;

    if budgets.is_empty() {
        println!("No budgets set. Add one with:");
        println!("  kharcha budgets set Food 5000");
        return Ok(());
    }

    println!();
    println!("💰 Monthly Budgets");
    println!("   ─────────────────────────────────────");
    for budget in budgets {
        println!(
            "   {:<20} {:>14}",
            budget.category,
            format_currency(budget.monthly_budget)
        );
    }

    Ok(())
}

pub fn cmd_budgets_set(db: &Database, category: &str, amount: f64) -> Result<()> {
    let budget = db.set_budget(category, amount)?;
    println!(
        "✅ Budget for {} set to {}",
        budget.category,
        format_currency(budget.monthly_budget)
    );
    Ok(())
}

pub fn cmd_budgets_remove(db: &Database, category: &str) -> Result<()> {
    db.deactivate_budget(category)?;
    println!("✅ Budget for {} removed", category);
    Ok(())
}
