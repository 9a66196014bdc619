//! CLI argument parsing for the smartnotes binary.

use clap::{Parser, Subcommand};

use notes_rebuild::RebuildMode;
use notes_search::DEFAULT_TOP_K;

/// SmartNotes
///
/// Semantic search over a directory of personal notes, with a
/// consistency-checked vector index.
#[derive(Parser, Debug)]
#[command(name = "smartnotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/smartnotes/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// smartnotes commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring the vector index in line with the notes directory
    Embed {
        /// Rebuild mode: auto (incremental), if-dirty, or full
        #[arg(short, long, default_value = "auto")]
        mode: RebuildMode,
    },

    /// Search the indexed notes
    Search {
        /// Query text
        query: String,

        /// Maximum number of hits
        #[arg(short = 'k', long = "top-k", default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Run the maintenance scheduler in the foreground until Ctrl-C
    Schedule,

    /// Show configuration and index diagnostics
    Status,
}
