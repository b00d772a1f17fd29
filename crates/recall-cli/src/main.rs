//! Recall CLI - manage training decks against a local cache and remote store
//!
//! Thin front end over `recall-core`: every command opens the local cache,
//! builds a sync engine from environment configuration, and calls one
//! engine operation.

mod cli;
mod commands;
mod error;


use std::env;

use clap::Parser;
use recall_core::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add_card, run_add_deck};
use crate::commands::common::{open_engine, resolve_db_path};
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::similar::run_similar;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    // Parse before reading RECALL_* so `--help` and `--version` never depend on them
    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("Error: {}", error.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = EngineConfig::from_env()?;
    init_tracing(&config)?;

    let db_path = resolve_db_path(cli.db_path, env::var_os("RECALL_DB_PATH"));

    if matches!(cli.command, Commands::Config) {
        return run_config(&config, &db_path);
    }

    let engine = open_engine(&db_path, config).await?;

    match cli.command {
        Commands::Status { kind, json } => run_status(&engine, kind.map(Into::into), json).await?,
        Commands::Sync { kind, json } => run_sync(&engine, kind.map(Into::into), json).await?,
        Commands::Similar {
            text,
            threshold,
            json,
        } => run_similar(&engine, &text, threshold, json).await?,
        Commands::AddDeck { name } => {
            run_add_deck(&engine, &name).await?;
        }
        Commands::AddCard {
            deck,
            content,
            tags,
            force,
        } => {
            run_add_card(&engine, &deck, &content, &tags, force).await?;
        }
        Commands::Delete { kind, id } => {
            run_delete(&engine, kind.into(), &id).await?;
        }
        Commands::Config => {}
    }

    Ok(())
}

fn init_tracing(config: &EngineConfig) -> Result<(), CliError> {
    // RUST_LOG wins over the configured filter when set
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|error| {
            CliError::Config(format!("invalid log filter {:?}: {error}", config.log_filter))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
