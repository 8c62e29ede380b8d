//! Ask command implementation

use anyhow::{bail, Result};
use kharcha_core::{answer_with_config, db::Database, reference_date, ChatAnswer, Config};

pub fn cmd_ask(
    db: &Database,
    question: &str,
    session: Option<&str>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let reply = answer_question(db, question, session, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("💬 {}", reply.answer);
    if let Some(data) = &reply.data {
        for point in data {
            println!("   • {}", point.label);
        }
    }

    Ok(())
}

/// Answer against a session's snapshot, or the shared dataset when no session is given
pub fn answer_question(
    db: &Database,
    question: &str,
    session: Option<&str>,
    config: &Config,
) -> Result<ChatAnswer> {
    let question = question.trim();
    if question.is_empty() {
        bail!("Question cannot be empty");
    }

    let transactions = match session {
        Some(id) => {
            let transactions = db.session_transactions(id)?;
            db.touch_session(id)?;
            transactions
        }
        None => db.list_transactions(None)?,
    };
    let budgets = db.budget_table()?;

    Ok(answer_with_config(
        question,
        reference_date(&transactions),
        &transactions,
        &budgets,
        &config.query,
    ))
}
