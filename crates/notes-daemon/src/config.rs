//! Configuration loading for smartnotes.
//!
//! Layered precedence, later sources override earlier:
//! 1. Built-in defaults
//! 2. Config file (~/.config/smartnotes/config.toml)
//! 3. CLI-specified config file
//! 4. Environment variables (SMARTNOTES_*, double underscore for nesting)
//!
//! CLI flags are applied by the caller after this returns.

use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

use notes_scheduler::ScheduleConfig;

use crate::error::DaemonError;

/// Directory name for engine state under the notes directory.
pub const STATE_DIR_NAME: &str = ".smartnotes";

/// Subdirectory of the state dir holding the vector index.
pub const VECSTORE_DIR_NAME: &str = "vecstore";

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory containing the note files (markdown or plain text).
    #[serde(default = "default_notes_dir")]
    pub notes_dir: String,

    /// Engine state directory. Defaults to `<notes_dir>/.smartnotes`.
    #[serde(default)]
    pub state_dir: Option<String>,

    /// Embedding model identifier.
    #[serde(default = "default_vec_model")]
    pub vec_model: String,

    /// Embedding dimension for the local hashing model.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// When the recurring jobs fire.
    #[serde(default)]
    pub report_times: ScheduleConfig,
}

fn default_notes_dir() -> String {
    UserDirs::new()
        .map(|dirs| dirs.home_dir().join("notes"))
        .unwrap_or_else(|| PathBuf::from("./notes"))
        .to_string_lossy()
        .to_string()
}

fn default_vec_model() -> String {
    "hashing-v1".to_string()
}

fn default_dimension() -> usize {
    notes_embeddings::hashing::DEFAULT_DIMENSION
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            state_dir: None,
            vec_model: default_vec_model(),
            dimension: default_dimension(),
            log_level: default_log_level(),
            report_times: ScheduleConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence. CLI flags should be applied
    /// by the caller after this returns.
    ///
    /// # Errors
    ///
    /// Fails if a config source cannot be read or a value does not parse.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, DaemonError> {
        let config_dir = ProjectDirs::from("", "", "smartnotes")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("notes_dir", default_notes_dir())
            .map_err(|e| DaemonError::Config(e.to_string()))?
            .set_default("vec_model", default_vec_model())
            .map_err(|e| DaemonError::Config(e.to_string()))?
            .set_default("dimension", default_dimension() as i64)
            .map_err(|e| DaemonError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| DaemonError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SMARTNOTES_NOTES_DIR, SMARTNOTES_LOG_LEVEL,
        // SMARTNOTES_REPORT_TIMES__DAILY, ...
        builder = builder.add_source(
            Environment::with_prefix("SMARTNOTES")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| DaemonError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Notes directory, with a leading `~/` expanded.
    pub fn notes_dir(&self) -> PathBuf {
        expand_home(&self.notes_dir)
    }

    /// Engine state directory.
    pub fn state_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => expand_home(dir),
            None => self.notes_dir().join(STATE_DIR_NAME),
        }
    }

    /// Vector index directory under the state dir.
    pub fn vecstore_dir(&self) -> PathBuf {
        self.state_dir().join(VECSTORE_DIR_NAME)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = UserDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
