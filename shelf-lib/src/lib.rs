//! Reconciliation and incremental sync engine for game-shelf.

pub mod error;
pub mod progress;
pub mod rate_limiter;
pub mod reconcile;
pub mod scorer;
pub mod settings;
pub mod store;
pub mod sync;

pub use error::SyncError;
pub use progress::{LogProgress, ReconcileProgress, SilentProgress};
pub use rate_limiter::RateLimiter;
pub use reconcile::{DEFAULT_MAX_WORKERS, Reconciler};
pub use settings::SyncSettings;
pub use store::FileStateStore;
pub use sync::{LibrarySyncManager, MergeStats, SyncReport, compute_delta, merge_outcomes};

// Re-export core types so frontends only need one dependency.
pub use shelf_core::{
    CatalogCandidate, CatalogLookupService, Collection, Cover, Franchise, LibraryEntry,
    LibraryState, OwnedRecord, OwnershipLink, OwnershipSource, ReconciliationOutcome,
    ResolvedGame, ScoredCandidate, ShelfError, StorePlatformParseError, StateStore, StorePlatform,
};
pub use tokio_util::sync::CancellationToken;
