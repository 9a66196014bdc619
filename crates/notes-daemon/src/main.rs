//! SmartNotes
//!
//! Semantic search over a directory of personal notes, backed by a
//! consistency-checked vector index.
//!
//! # Usage
//!
//! ```bash
//! smartnotes embed [--mode auto|if-dirty|full]
//! smartnotes search <query> [-k N]
//! smartnotes schedule
//! smartnotes status
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/smartnotes/config.toml)
//! 3. Environment variables (SMARTNOTES_*)
//! 4. CLI flags

use anyhow::{Context, Result};
use clap::Parser;

use notes_daemon::{handle_embed, handle_schedule, handle_search, show_status, Cli, Commands, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(log_level) = cli.log_level {
        settings.log_level = log_level;
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SMARTNOTES_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Embed { mode } => handle_embed(&settings, mode).await?,
        Commands::Search { query, top_k } => handle_search(&settings, &query, top_k).await?,
        Commands::Schedule => handle_schedule(&settings).await?,
        Commands::Status => show_status(&settings).await?,
    }

    Ok(())
}
