//! Persisted dirty flag.
//!
//! A marker file under the vecstore directory whose presence means "at
//! least one already-indexed note's content changed since the last full
//! rebuild". The external record-update path sets it; only a successful
//! full rebuild clears it. At-least-once set, exactly-once clear per
//! successful full rebuild.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::error::VecStoreError;

/// File name of the dirty marker within the vecstore directory.
pub const DIRTY_MARKER: &str = ".dirty";

/// Handle to the persisted dirty flag.
#[derive(Debug, Clone)]
pub struct DirtyFlag {
    path: PathBuf,
}

impl DirtyFlag {
    /// Flag located in the given vecstore (maintenance) directory.
    pub fn new(vecstore_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: vecstore_dir.into().join(DIRTY_MARKER),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark the index stale. Idempotent; the marker content records when
    /// staleness was last signalled.
    pub fn set(&self) -> Result<(), VecStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, Utc::now().to_rfc3339())?;
        debug!(path = ?self.path, "Dirty flag set");
        Ok(())
    }

    /// Whether the flag is currently set.
    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Clear the flag. Called only after a successful full rebuild.
    /// Clearing an absent flag is a no-op.
    pub fn clear(&self) -> Result<(), VecStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "Dirty flag cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
