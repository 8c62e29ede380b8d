//! Import command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use kharcha_core::{db::Database, ensure_csv_filename, import_csv, Config, ImportTarget};

/// Replace the shared dataset, or a session's snapshot, with a CSV file
pub fn cmd_import(
    db: &Database,
    file: &Path,
    session: Option<&str>,
    config: &Config,
) -> Result<()> {
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ensure_csv_filename(&filename)?;

    let target = match session {
        Some(id) => {
            db.get_session(id)?
                .with_context(|| format!("Session not found: {}", id))?;
            ImportTarget::Session(id)
        }
        None => ImportTarget::Shared,
    };

    println!("📥 Importing {}...", file.display());

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let report = import_csv(db, reader, target, &config.classifier)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("✅ Imported {} transactions", report.rows);
    if report.skipped > 0 {
        println!("   ⚠️  Skipped {} rows with unreadable amounts", report.skipped);
    }
    if report.classified > 0 {
        println!(
            "   🏷️  Categorized {} uncategorized rows automatically",
            report.classified
        );
    }
    match session {
        Some(id) => println!("   Session {} is now at version {}", id, report.version),
        None => println!("   Dataset version: {}", report.version),
    }

    Ok(())
}
