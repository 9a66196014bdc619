//! # notes-vecstore
//!
//! On-disk vector index store for smartnotes.
//!
//! Holds one vector per indexed note together with the manifest of indexed
//! note ids, colocated under a fixed `vecstore/` directory. Mutations go
//! through exactly two operations: `append` (incremental add) and
//! `replace_all` (full rebuild). Both stage the complete new index under
//! `vecstore/staging/` and promote it with a single atomic rename, so a
//! concurrent `query` always observes either the fully-old or the
//! fully-new index.
//!
//! The crate also owns the persisted dirty flag (`vecstore/.dirty`): the
//! signal that an already-indexed note's content changed and its vector is
//! stale until the next full rebuild.

pub mod dirty;
pub mod error;
pub mod manifest;
pub mod record;
pub mod store;

pub use dirty::DirtyFlag;
pub use error::VecStoreError;
pub use manifest::{IndexManifest, ManifestDiff};
pub use record::VectorRecord;
pub use store::{IndexStats, QueryHit, VecStore, INDEX_FILE, STAGING_DIR};
