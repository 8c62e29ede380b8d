//! Kharcha CLI - Rule-based spending assistant
//!
//! Usage:
//!   kharcha init                      Initialize database
//!   kharcha import --file CSV         Replace the shared dataset
//!   kharcha ask "top 5 expenses"      Ask a question
//!   kharcha serve --port 3000         Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Import { file, session } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, session.as_deref(), &config)
        }
        Commands::Ask {
            question,
            session,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_ask(&db, &question.join(" "), session.as_deref(), json, &config)
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_budgets_list(&db),
                Some(BudgetsAction::Set { category, amount }) => {
                    commands::cmd_budgets_set(&db, &category, amount)
                }
                Some(BudgetsAction::Remove { category }) => {
                    commands::cmd_budgets_remove(&db, &category)
                }
            }
        }
        Commands::Alerts => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_alerts(&db)
        }
        Commands::Summary { period, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, period.as_deref(), limit)
        }
        Commands::Sessions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_sessions_list(&db),
                Some(SessionsAction::Create { name }) => {
                    commands::cmd_sessions_create(&db, name.as_deref())
                }
                Some(SessionsAction::Delete { id }) => commands::cmd_sessions_delete(&db, &id),
            }
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions_list(&db, limit)
        }
        Commands::Admin { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                AdminAction::Clear { yes } => commands::cmd_admin_clear(&db, yes),
            }
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                config,
            )
            .await
        }
    }
}
