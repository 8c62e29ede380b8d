//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kharcha - Ask questions about your spending
#[derive(Parser)]
#[command(name = "kharcha")]
#[command(about = "Self-hosted spending assistant for CSV bank exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "kharcha.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set KHARCHA_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Config file (overrides KHARCHA_CONFIG and the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Replace a dataset with the contents of a CSV file
    ///
    /// The file needs date, description, amount and category columns.
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Import into this session instead of the shared dataset
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Ask a question, e.g. "how much did I spend on food last month"
    Ask {
        /// The question (quotes optional)
        #[arg(required = true)]
        question: Vec<String>,

        /// Ask about a session's data instead of the shared dataset
        #[arg(short, long)]
        session: Option<String>,

        /// Print the raw answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage monthly budgets (lists active budgets by default)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Show overspent budgets for the latest month
    Alerts,

    /// Spending summary of the shared dataset
    Summary {
        /// Restrict to this_month, last_month, this_week or last_week
        #[arg(short, long)]
        period: Option<String>,

        /// Number of merchants to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Manage isolated sessions (lists sessions by default)
    Sessions {
        #[command(subcommand)]
        action: Option<SessionsAction>,
    },

    /// List the most recent transactions
    Transactions {
        /// Maximum number to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Maintenance commands
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory of static files to serve (web UI)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// Create or update a budget
    Set {
        /// Category name, e.g. Food
        category: String,

        /// Monthly limit
        amount: f64,
    },

    /// Stop tracking a budget
    Remove {
        /// Category name
        category: String,
    },
}

#[derive(Subcommand)]
pub enum SessionsAction {
    /// Create an empty session
    Create {
        /// Session name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete a session and its data
    Delete {
        /// Session ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Delete every transaction in the shared dataset
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}
