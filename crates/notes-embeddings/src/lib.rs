//! # notes-embeddings
//!
//! Embedding generation for smartnotes.
//!
//! Defines the `EmbeddingProvider` seam the index engine embeds through,
//! plus a deterministic local provider that needs no model download. A
//! sentence-transformer backed provider plugs in behind the same trait;
//! the engine only relies on "text in, fixed-dimension unit vector out,
//! may fail per text".

pub mod error;
pub mod hashing;
pub mod provider;

pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use provider::{Embedding, EmbeddingProvider};
