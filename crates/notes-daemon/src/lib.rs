//! smartnotes daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (embed, search, schedule, status)
//! - `config`: Layered configuration loading
//! - `records`: Filesystem-backed record store over the notes directory

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod records;

pub use cli::{Cli, Commands};
pub use commands::{handle_embed, handle_schedule, handle_search, show_status};
pub use config::Settings;
pub use error::DaemonError;
pub use records::FsRecordStore;
