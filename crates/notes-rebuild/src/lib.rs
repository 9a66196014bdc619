//! # notes-rebuild
//!
//! Rebuild policy engine for the smartnotes vector index.
//!
//! On every invocation the engine decides between an incremental add of
//! missing vectors and a full stage-and-swap rebuild, driven by an explicit
//! request mode and the persisted dirty flag:
//!
//! | mode      | dirty | action                    | flag after |
//! |-----------|-------|---------------------------|------------|
//! | auto      | any   | incremental add           | unchanged  |
//! | if-dirty  | set   | full rebuild              | cleared    |
//! | if-dirty  | clear | incremental add           | unchanged  |
//! | full      | any   | full rebuild              | cleared    |
//!
//! Every run is all-or-nothing: a provider or store failure leaves the
//! index and the flag exactly as they were.

pub mod engine;
pub mod error;

pub use engine::{RebuildAction, RebuildEngine, RebuildMode, RebuildOutcome};
pub use error::{PartialEmbeddingError, RebuildError};
