//! # notes-types
//!
//! Shared domain types for smartnotes.
//!
//! This crate defines the note identity model and the read-only interface
//! to the authoritative record store. The record store itself (SQLite in
//! the reference deployment) is an external collaborator; the rest of the
//! system only ever consumes the `RecordStore` trait defined here.

pub mod error;
pub mod note;
pub mod store;

pub use error::StoreError;
pub use note::{NoteId, NoteMeta};
pub use store::{InMemoryRecordStore, RecordStore};
