#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use shelf_lib::{
    CatalogCandidate, CatalogLookupService, Collection, Cover, Franchise, LibraryState,
    OwnedRecord, OwnershipSource, ShelfError, StateStore, StorePlatform,
};

pub fn candidate(id: u64, title: &str) -> CatalogCandidate {
    CatalogCandidate {
        catalog_id: id,
        title: title.to_string(),
        ..Default::default()
    }
}

pub fn steam(id: i64, title: &str) -> OwnedRecord {
    OwnedRecord::new(StorePlatform::Steam, id, title)
}

/// Catalog answering from fixed tables, counting every call.
#[derive(Default)]
pub struct FakeCatalog {
    pub search_results: HashMap<String, Vec<CatalogCandidate>>,
    pub failing_searches: HashSet<String>,
    pub games: HashMap<u64, CatalogCandidate>,
    pub covers: HashMap<u64, Cover>,
    pub franchises: HashMap<u64, Franchise>,
    pub collections: HashMap<u64, Collection>,
    pub fail_covers: bool,
    pub fail_franchises: bool,
    pub fail_collections: bool,
    /// Title searches never complete.
    pub hang: bool,
    calls: AtomicUsize,
    searches: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, title: &str, candidates: Vec<CatalogCandidate>) -> Self {
        for c in &candidates {
            self.games.insert(c.catalog_id, c.clone());
        }
        self.search_results.insert(title.to_string(), candidates);
        self
    }

    pub fn with_failing_search(mut self, title: &str) -> Self {
        self.failing_searches.insert(title.to_string());
        self
    }

    pub fn with_cover(mut self, id: u64, image_id: &str) -> Self {
        self.covers.insert(
            id,
            Cover {
                id,
                image_id: image_id.to_string(),
            },
        );
        self
    }

    pub fn with_franchise(mut self, id: u64, name: &str) -> Self {
        self.franchises.insert(
            id,
            Franchise {
                id,
                name: name.to_string(),
                slug: None,
            },
        );
        self
    }

    pub fn with_collection(mut self, id: u64, name: &str) -> Self {
        self.collections.insert(
            id,
            Collection {
                id,
                name: name.to_string(),
                slug: None,
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn searches_for(&self, title: &str) -> usize {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == title)
            .count()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl CatalogLookupService for FakeCatalog {
    async fn search_by_title(&self, title: &str) -> Result<Vec<CatalogCandidate>, ShelfError> {
        self.hit();
        self.searches.lock().unwrap().push(title.to_string());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.failing_searches.contains(title) {
            return Err(ShelfError::unavailable("connection reset"));
        }
        Ok(self.search_results.get(title).cloned().unwrap_or_default())
    }

    async fn get_game(&self, catalog_id: u64) -> Result<Option<CatalogCandidate>, ShelfError> {
        self.hit();
        Ok(self.games.get(&catalog_id).cloned())
    }

    async fn get_cover(&self, cover_id: u64) -> Result<Option<Cover>, ShelfError> {
        self.hit();
        if self.fail_covers {
            return Err(ShelfError::invalid_argument("bad cover payload"));
        }
        Ok(self.covers.get(&cover_id).cloned())
    }

    async fn get_franchises(&self, ids: &[u64]) -> Result<Vec<Franchise>, ShelfError> {
        self.hit();
        if self.fail_franchises {
            return Err(ShelfError::unavailable("timeout"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.franchises.get(id).cloned())
            .collect())
    }

    async fn get_collection(&self, collection_id: u64) -> Result<Option<Collection>, ShelfError> {
        self.hit();
        if self.fail_collections {
            return Err(ShelfError::internal("boom"));
        }
        Ok(self.collections.get(&collection_id).cloned())
    }
}

/// Ownership source returning a fixed list.
pub struct FakeSource {
    pub platform: StorePlatform,
    pub records: Vec<OwnedRecord>,
    pub fail: bool,
    pub hang: bool,
}

impl FakeSource {
    pub fn steam(records: Vec<OwnedRecord>) -> Self {
        Self {
            platform: StorePlatform::Steam,
            records,
            fail: false,
            hang: false,
        }
    }

    pub fn failing(platform: StorePlatform) -> Self {
        Self {
            platform,
            records: vec![],
            fail: true,
            hang: false,
        }
    }
}

impl OwnershipSource for FakeSource {
    fn platform(&self) -> StorePlatform {
        self.platform
    }

    async fn get_owned_records(&self) -> Result<Vec<OwnedRecord>, ShelfError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(ShelfError::unavailable("store API down"));
        }
        Ok(self.records.clone())
    }
}

/// In-memory store counting writes.
#[derive(Default)]
pub struct MemoryStore {
    states: Mutex<HashMap<String, LibraryState>>,
    saves: AtomicUsize,
    pub fail_saves: bool,
}

impl MemoryStore {
    pub fn with_state(key: &str, state: LibraryState) -> Self {
        let store = Self::default();
        store.states.lock().unwrap().insert(key.to_string(), state);
        store
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self, key: &str) -> Option<LibraryState> {
        self.states.lock().unwrap().get(key).cloned()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<LibraryState>, ShelfError> {
        Ok(self.stored(key))
    }

    fn save(&self, key: &str, state: &LibraryState) -> Result<(), ShelfError> {
        if self.fail_saves {
            return Err(ShelfError::Io(std::io::Error::other("disk full")));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.states
            .lock()
            .unwrap()
            .insert(key.to_string(), state.clone());
        Ok(())
    }
}
