//! # notes-search
//!
//! Semantic search over the published vector index: embed the query with
//! the same provider that built the index, scan the current snapshot for
//! the top-k nearest notes by cosine similarity, and resolve each hit's
//! metadata from the record store.

pub mod error;
pub mod executor;

pub use error::SearchError;
pub use executor::{SearchExecutor, SearchHit, DEFAULT_TOP_K};
