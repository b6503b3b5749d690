use shelf_core::{ShelfError, StorePlatform};
use thiserror::Error;

/// Errors that abort a library sync cycle. Nothing is persisted when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The ownership list could not be fetched.
    #[error("Failed to fetch owned games: {0}")]
    Ownership(#[source] ShelfError),

    /// Loading or saving library state failed.
    #[error("Library storage error: {0}")]
    Store(#[source] ShelfError),

    /// An explicitly requested catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[source] ShelfError),

    /// No unreconciled record with this id exists.
    #[error("No unreconciled {platform} record with id {source_id}")]
    UnknownRecord {
        platform: StorePlatform,
        source_id: i64,
    },

    #[error("Sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Wrap a catalog-side failure, keeping cancellation distinct.
    pub(crate) fn catalog(err: ShelfError) -> Self {
        match err {
            ShelfError::Cancelled => Self::Cancelled,
            other => Self::Catalog(other),
        }
    }

    pub(crate) fn ownership(err: ShelfError) -> Self {
        match err {
            ShelfError::Cancelled => Self::Cancelled,
            other => Self::Ownership(other),
        }
    }
}
