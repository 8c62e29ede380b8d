//! Session command implementations

use anyhow::Result;
use kharcha_core::db::Database;

pub fn cmd_sessions_list(db: &Database) -> Result<()> {
    let sessions = db.list_sessions()?;

    if sessions.is_empty() {
        println!("No sessions. Create one with:");
        println!("  kharcha sessions create --name \"March review\"");
        return Ok(());
    }

    println!();
    println!("🗂️  Sessions");
    println!("   ─────────────────────────────────────────────────────────────");
    for session in sessions {
        let data = if session.has_data { "data" } else { "empty" };
        println!(
            "   {} │ {:<20} │ v{} │ {} │ {}",
            session.session_id,
            super::truncate(&session.session_name, 20),
            session.version,
            data,
            session.last_activity.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn cmd_sessions_create(db: &Database, name: Option<&str>) -> Result<()> {
    let session = db.create_session(name)?;
    println!("✅ Created session {}", session.session_name);
    println!("   ID: {}", session.session_id);
    println!();
    println!(
        "   Upload with: kharcha import --file statement.csv --session {}",
        session.session_id
    );
    Ok(())
}

pub fn cmd_sessions_delete(db: &Database, id: &str) -> Result<()> {
    db.delete_session(id)?;
    println!("✅ Deleted session {}", id);
    Ok(())
}
