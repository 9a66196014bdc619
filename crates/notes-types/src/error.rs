//! Record store error types.

use thiserror::Error;

use crate::note::NoteId;

/// Errors surfaced by the record store read interface.
///
/// Any of these aborts the calling operation as a whole; callers never see
/// a partially applied index mutation after a store read failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or queried.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// A note id present in a listing could not be fetched.
    #[error("Note not found: {0}")]
    NotFound(NoteId),

    /// IO error from the backing storage.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("unavailable"));

        let err = StoreError::NotFound(NoteId::from("2024-01-01-walk"));
        assert!(err.to_string().contains("2024-01-01-walk"));
    }
}
