//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the config file
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use kharcha_core::{db::Database, Config};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load `--config`, `KHARCHA_CONFIG`, the user config, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load config")
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let version = db.dataset_version()?;
    println!("   Dataset version: {}", version.version);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: kharcha import --file statement.csv");
    println!("  2. Ask a question: kharcha ask \"how much did I spend on food this month\"");
    println!("  3. Start web UI: kharcha serve");

    Ok(())
}
