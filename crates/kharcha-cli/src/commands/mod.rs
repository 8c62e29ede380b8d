//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `admin` - Maintenance commands (clear)
//! - `ask` - Chat questions against the shared dataset or a session
//! - `budgets` - Budget management commands (list, set, remove)
//! - `core` - Init and shared utilities (open_db, load_config)
//! - `import` - CSV import
//! - `reports` - Alerts and spending summary
//! - `serve` - Web server command
//! - `sessions` - Session management commands (list, create, delete)
//! - `transactions` - Recent transaction listing

pub mod admin;
pub mod ask;
pub mod budgets;
pub mod core;
pub mod import;
pub mod reports;
pub mod serve;
pub mod sessions;
pub mod transactions;

// Re-export command functions for main.rs
pub use admin::*;
pub use ask::*;
pub use budgets::*;
pub use core::*;
pub use import::*;
pub use reports::*;
pub use serve::*;
pub use sessions::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
