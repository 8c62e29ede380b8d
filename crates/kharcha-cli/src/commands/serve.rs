//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use kharcha_core::Config;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    config: Config,
) -> Result<()> {
    println!("🚀 Starting Kharcha web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let mut server_config = kharcha_server::ServerConfig::from_settings(&config.server);
    server_config.require_auth = !no_auth;

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if server_config.api_keys.is_empty() {
        println!(
            "   🔒 Authentication: no API keys configured ({}), all requests will be rejected",
            kharcha_server::API_KEYS_ENV
        );
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            server_config.api_keys.len(),
            kharcha_server::API_KEYS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    kharcha_server::serve_with_config(db, host, port, static_dir_str, server_config, config)
        .await?;

    Ok(())
}
