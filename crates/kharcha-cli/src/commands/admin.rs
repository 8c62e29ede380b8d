//! Admin command implementations

use anyhow::{bail, Result};
use kharcha_core::db::Database;
use tracing::warn;

/// Delete the shared dataset
///
/// Sessions and budgets are kept. The dataset version is bumped so clients
/// drop their cached views.
pub fn cmd_admin_clear(db: &Database, yes: bool) -> Result<()> {
    if !yes {
        bail!(
            "Refusing to delete {} transactions without --yes",
            db.count_transactions()?
        );
    }

    let (deleted, version) = db.clear_transactions()?;
    warn!(deleted, version, "Shared dataset cleared");

    println!("🗑️  Deleted {} transactions", deleted);
    println!("   Dataset version: {}", version);
    Ok(())
}
