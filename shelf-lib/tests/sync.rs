mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeCatalog, FakeSource, MemoryStore, candidate, steam};
use shelf_lib::{
    CancellationToken, FileStateStore, LibraryEntry, LibrarySyncManager, LibraryState,
    OwnedRecord, OwnershipLink, RateLimiter, ReconciliationOutcome, Reconciler, ResolvedGame,
    SilentProgress, StorePlatform, SyncError, merge_outcomes,
};

const USER: &str = "alice";

fn reconciler(catalog: FakeCatalog) -> Reconciler<FakeCatalog> {
    Reconciler::new(catalog, Arc::new(RateLimiter::new(1000)))
}

fn diablo_catalog() -> FakeCatalog {
    FakeCatalog::new().with_search(
        "Diablo",
        vec![
            candidate(1211, "Diablo II"),
            candidate(1210, "Diablo"),
            candidate(1212, "Diablo: Hellfire"),
        ],
    )
}

fn diablo_state() -> LibraryState {
    LibraryState {
        entries: vec![LibraryEntry::from_resolved(
            ResolvedGame::bare(candidate(1210, "Diablo")),
            steam(1, "Diablo").link(),
        )],
        unreconciled: vec![],
    }
}

#[tokio::test]
async fn new_record_becomes_entry() {
    let store = MemoryStore::default();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    assert!(manager.state().is_empty());

    let reconciler = reconciler(diablo_catalog());
    let source = FakeSource::steam(vec![steam(1, "Diablo")]);
    let report = manager
        .sync(&source, &reconciler, &CancellationToken::new(), &SilentProgress)
        .await
        .unwrap();

    assert_eq!(report.delta, 1);
    assert_eq!(report.resolved, 1);
    assert!(report.persisted);

    let state = manager.state();
    assert_eq!(state.entries.len(), 1);
    let entry = state.entry(1210).unwrap();
    assert_eq!(
        entry.ownership_links,
        vec![OwnershipLink {
            source_id: 1,
            platform: StorePlatform::Steam
        }]
    );
    assert!(state.unreconciled.is_empty());
    assert_eq!(store.stored(USER).as_ref(), Some(state));
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn unmatched_record_is_kept_unreconciled() {
    let store = MemoryStore::default();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let source = FakeSource::steam(vec![steam(9, "Unknown Game XYZ")]);

    let report = manager
        .sync(
            &source,
            &reconciler(FakeCatalog::new()),
            &CancellationToken::new(),
            &SilentProgress,
        )
        .await
        .unwrap();

    assert_eq!(report.unresolved, 1);
    assert!(manager.state().entries.is_empty());
    assert_eq!(manager.state().unreconciled, vec![steam(9, "Unknown Game XYZ")]);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn unchanged_ownership_skips_catalog_and_store() {
    let store = MemoryStore::with_state(USER, diablo_state());
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let reconciler = reconciler(diablo_catalog());
    let source = FakeSource::steam(vec![steam(1, "Diablo")]);

    let report = manager
        .sync(&source, &reconciler, &CancellationToken::new(), &SilentProgress)
        .await
        .unwrap();

    assert_eq!(report.owned, 1);
    assert_eq!(report.delta, 0);
    assert!(!report.persisted);
    assert_eq!(reconciler.catalog().call_count(), 0);
    assert_eq!(store.save_count(), 0);
    assert_eq!(manager.state(), &diablo_state());
}

#[tokio::test]
async fn second_sync_is_a_no_op() {
    let store = MemoryStore::default();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let reconciler = reconciler(diablo_catalog());
    let source = FakeSource::steam(vec![steam(1, "Diablo"), steam(9, "Unknown Game XYZ")]);
    let cancel = CancellationToken::new();

    manager
        .sync(&source, &reconciler, &cancel, &SilentProgress)
        .await
        .unwrap();
    let after_first = manager.state().clone();
    let calls = reconciler.catalog().call_count();

    let report = manager
        .sync(&source, &reconciler, &cancel, &SilentProgress)
        .await
        .unwrap();

    assert!(!report.persisted);
    assert_eq!(manager.state(), &after_first);
    assert_eq!(reconciler.catalog().call_count(), calls);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn only_new_records_are_reconciled() {
    let store = MemoryStore::with_state(USER, diablo_state());
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let catalog = diablo_catalog().with_search("Portal", vec![candidate(71, "Portal")]);
    let reconciler = reconciler(catalog);
    let source = FakeSource::steam(vec![
        steam(1, "Diablo"),
        steam(400, "Portal"),
        steam(400, "Portal"),
    ]);

    let report = manager
        .sync(&source, &reconciler, &CancellationToken::new(), &SilentProgress)
        .await
        .unwrap();

    assert_eq!(report.owned, 3);
    assert_eq!(report.delta, 1);
    assert_eq!(reconciler.catalog().searches_for("Diablo"), 0);
    assert_eq!(reconciler.catalog().searches_for("Portal"), 1);
    assert_eq!(manager.state().entries.len(), 2);
}

#[tokio::test]
async fn ownership_failure_changes_nothing() {
    let store = MemoryStore::with_state(USER, diablo_state());
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let reconciler = reconciler(diablo_catalog());

    let err = manager
        .sync(
            &FakeSource::failing(StorePlatform::Steam),
            &reconciler,
            &CancellationToken::new(),
            &SilentProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Ownership(_)));
    assert_eq!(reconciler.catalog().call_count(), 0);
    assert_eq!(store.save_count(), 0);
    assert_eq!(manager.state(), &diablo_state());
}

#[tokio::test]
async fn store_failure_keeps_previous_state() {
    let store = MemoryStore::failing();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let source = FakeSource::steam(vec![steam(1, "Diablo")]);

    let err = manager
        .sync(
            &source,
            &reconciler(diablo_catalog()),
            &CancellationToken::new(),
            &SilentProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Store(_)));
    assert!(manager.state().is_empty());
    assert!(store.stored(USER).is_none());
}

#[tokio::test]
async fn cancelled_sync_persists_nothing() {
    let store = MemoryStore::default();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = manager
        .sync(
            &FakeSource::steam(vec![steam(1, "Diablo")]),
            &reconciler(diablo_catalog()),
            &cancel,
            &SilentProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Cancelled));
    assert!(manager.state().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_ownership_fetch() {
    let store = MemoryStore::default();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let mut source = FakeSource::steam(vec![steam(1, "Diablo")]);
    source.hang = true;
    let reconciler = reconciler(diablo_catalog());
    let cancel = CancellationToken::new();

    let (result, ()) = tokio::join!(
        manager.sync(&source, &reconciler, &cancel, &SilentProgress),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        }
    );

    assert!(matches!(result, Err(SyncError::Cancelled)));
    assert_eq!(reconciler.catalog().call_count(), 0);
    assert!(manager.state().is_empty());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn pending_records_survive_later_cycles() {
    let store = MemoryStore::default();
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let catalog = FakeCatalog::new().with_search("Diablo", vec![candidate(1210, "Diablo")]);
    let reconciler = reconciler(catalog);
    let cancel = CancellationToken::new();

    let first = FakeSource::steam(vec![steam(9, "Unknown Game XYZ")]);
    manager
        .sync(&first, &reconciler, &cancel, &SilentProgress)
        .await
        .unwrap();
    assert_eq!(manager.state().unreconciled, vec![steam(9, "Unknown Game XYZ")]);

    let second = FakeSource::steam(vec![
        steam(9, "Unknown Game XYZ"),
        steam(400, "Diablo"),
        steam(5, "Nope"),
    ]);
    let report = manager
        .sync(&second, &reconciler, &cancel, &SilentProgress)
        .await
        .unwrap();

    assert_eq!(report.delta, 2);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.unresolved, 1);
    let state = manager.state();
    assert_eq!(
        state.unreconciled,
        vec![steam(9, "Unknown Game XYZ"), steam(5, "Nope")]
    );
    assert_eq!(state.entries.len(), 1);
    assert!(state.entry(1210).unwrap().is_owned_as(StorePlatform::Steam, 400));
    // Record 9 was already pending, so only the two new titles were searched.
    assert_eq!(reconciler.catalog().searches_for("Unknown Game XYZ"), 1);
    assert_eq!(store.stored(USER).as_ref(), Some(state));
}

#[tokio::test]
async fn retry_resolves_pending_records() {
    let pending = LibraryState {
        entries: vec![],
        unreconciled: vec![steam(9, "Unknown Game XYZ"), steam(1, "Diablo")],
    };
    let store = MemoryStore::with_state(USER, pending);
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();

    let report = manager
        .retry_unreconciled(
            StorePlatform::Steam,
            &reconciler(diablo_catalog()),
            &CancellationToken::new(),
            &SilentProgress,
        )
        .await
        .unwrap();

    assert_eq!(report.delta, 2);
    assert_eq!(report.resolved, 1);
    assert!(report.persisted);
    assert!(manager.state().entry(1210).unwrap().is_owned_as(StorePlatform::Steam, 1));
    assert_eq!(manager.state().unreconciled, vec![steam(9, "Unknown Game XYZ")]);
}

#[tokio::test]
async fn retry_without_progress_does_not_save() {
    let pending = LibraryState {
        entries: vec![],
        unreconciled: vec![steam(9, "Unknown Game XYZ")],
    };
    let store = MemoryStore::with_state(USER, pending.clone());
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();

    let report = manager
        .retry_unreconciled(
            StorePlatform::Steam,
            &reconciler(FakeCatalog::new()),
            &CancellationToken::new(),
            &SilentProgress,
        )
        .await
        .unwrap();

    assert!(!report.persisted);
    assert_eq!(store.save_count(), 0);
    assert_eq!(manager.state(), &pending);
}

#[tokio::test]
async fn manual_match_resolves_record() {
    let pending = LibraryState {
        entries: vec![],
        unreconciled: vec![steam(9, "Unknown Game XYZ")],
    };
    let store = MemoryStore::with_state(USER, pending);
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let reconciler = reconciler(diablo_catalog());
    let cancel = CancellationToken::new();

    let err = manager
        .manual_match(StorePlatform::Steam, 42, 1210, &reconciler, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::UnknownRecord {
            source_id: 42,
            ..
        }
    ));

    let err = manager
        .manual_match(StorePlatform::Steam, 9, 5555, &reconciler, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Catalog(_)));
    assert_eq!(store.save_count(), 0);

    manager
        .manual_match(StorePlatform::Steam, 9, 1210, &reconciler, &cancel)
        .await
        .unwrap();
    let state = manager.state();
    assert!(state.unreconciled.is_empty());
    assert!(state.entry(1210).unwrap().is_owned_as(StorePlatform::Steam, 9));
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn same_game_on_another_store_adds_link() {
    let store = MemoryStore::with_state(USER, diablo_state());
    let mut manager = LibrarySyncManager::load(USER, &store).unwrap();
    let source = FakeSource {
        platform: StorePlatform::Gog,
        records: vec![OwnedRecord::new(StorePlatform::Gog, 1, "Diablo")],
        fail: false,
        hang: false,
    };

    let report = manager
        .sync(
            &source,
            &reconciler(diablo_catalog()),
            &CancellationToken::new(),
            &SilentProgress,
        )
        .await
        .unwrap();

    assert_eq!(report.delta, 1);
    let state = manager.state();
    assert_eq!(state.entries.len(), 1);
    let entry = state.entry(1210).unwrap();
    assert!(entry.is_owned_as(StorePlatform::Steam, 1));
    assert!(entry.is_owned_as(StorePlatform::Gog, 1));
}

#[test]
fn merge_collapses_duplicate_winners() {
    let mut state = LibraryState::default();
    let game = ResolvedGame::bare(candidate(1210, "Diablo"));
    let stats = merge_outcomes(
        &mut state,
        vec![
            ReconciliationOutcome::Resolved {
                record: steam(1, "Diablo"),
                game: game.clone(),
            },
            ReconciliationOutcome::Resolved {
                record: steam(2, "DIABLO"),
                game,
            },
            ReconciliationOutcome::Unresolved {
                record: steam(9, "Unknown Game XYZ"),
            },
            ReconciliationOutcome::Unresolved {
                record: steam(9, "Unknown Game XYZ"),
            },
        ],
    );

    assert_eq!(stats.resolved, 2);
    assert_eq!(stats.entries_created, 1);
    assert_eq!(stats.links_added, 1);
    assert_eq!(state.entries.len(), 1);
    assert_eq!(state.entries[0].ownership_links.len(), 2);
    assert_eq!(state.unreconciled.len(), 1);
}

#[tokio::test]
async fn file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let reconciler = reconciler(diablo_catalog());
    let source = FakeSource::steam(vec![steam(1, "Diablo"), steam(9, "Unknown Game XYZ")]);

    let mut manager = LibrarySyncManager::load(USER, FileStateStore::new(dir.path())).unwrap();
    manager
        .sync(&source, &reconciler, &CancellationToken::new(), &SilentProgress)
        .await
        .unwrap();
    let saved = manager.state().clone();

    let reloaded = LibrarySyncManager::load(USER, FileStateStore::new(dir.path())).unwrap();
    assert_eq!(reloaded.state(), &saved);
    assert_eq!(reloaded.state().entries.len(), 1);
    assert_eq!(reloaded.state().unreconciled.len(), 1);
}
