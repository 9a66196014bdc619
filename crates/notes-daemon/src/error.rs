//! Daemon error types.

use thiserror::Error;

/// Errors from daemon setup.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured embedding model is not available locally.
    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),
}
