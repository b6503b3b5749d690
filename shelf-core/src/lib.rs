//! Core types and collaborator contracts for game-shelf.
//!
//! The sync engine in `shelf-lib` only talks to the outside world through the
//! three traits defined here. Concrete HTTP-backed implementations live in
//! `shelf-remote`; tests use in-memory fakes.

pub mod error;
pub mod model;
pub mod platform;

pub use error::ShelfError;
pub use model::{
    CatalogCandidate, Collection, Cover, Franchise, LibraryEntry, LibraryState, OwnedRecord,
    OwnershipLink, ReconciliationOutcome, ResolvedGame, ScoredCandidate,
};
pub use platform::{StorePlatform, StorePlatformParseError};

/// Read access to the external game catalog.
///
/// Implementations assume authentication already happened; they must not
/// rate limit on their own, the reconciler acquires a slot before each call.
#[allow(async_fn_in_trait)]
pub trait CatalogLookupService {
    /// Search games by title. Candidates are returned in catalog order.
    async fn search_by_title(&self, title: &str) -> Result<Vec<CatalogCandidate>, ShelfError>;

    /// Fetch a single game by catalog id.
    async fn get_game(&self, catalog_id: u64) -> Result<Option<CatalogCandidate>, ShelfError>;

    /// Fetch cover art details for a cover reference.
    async fn get_cover(&self, cover_id: u64) -> Result<Option<Cover>, ShelfError>;

    /// Fetch franchise details for a batch of franchise references.
    async fn get_franchises(&self, ids: &[u64]) -> Result<Vec<Franchise>, ShelfError>;

    /// Fetch collection (series) details.
    async fn get_collection(&self, collection_id: u64) -> Result<Option<Collection>, ShelfError>;
}

/// A storefront that can list the games a user owns.
#[allow(async_fn_in_trait)]
pub trait OwnershipSource {
    /// The store every returned record belongs to.
    fn platform(&self) -> StorePlatform;

    /// Fetch the complete current ownership list.
    async fn get_owned_records(&self) -> Result<Vec<OwnedRecord>, ShelfError>;
}

/// Durable storage for library snapshots, keyed by user.
pub trait StateStore {
    /// Load the snapshot stored under `key`, or `None` if nothing was saved yet.
    fn load(&self, key: &str) -> Result<Option<LibraryState>, ShelfError>;

    /// Replace the snapshot stored under `key`. Must be all-or-nothing.
    fn save(&self, key: &str, state: &LibraryState) -> Result<(), ShelfError>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn load(&self, key: &str) -> Result<Option<LibraryState>, ShelfError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, state: &LibraryState) -> Result<(), ShelfError> {
        (**self).save(key, state)
    }
}
