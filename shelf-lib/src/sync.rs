//! Incremental library sync.
//!
//! A sync cycle fetches the current ownership list of one store, keeps only
//! the records the library does not know about yet, reconciles that delta
//! against the catalog and merges the outcomes into the persisted state.
//!
//! All changes are applied to a working copy. The in-memory state is only
//! replaced after the store accepted the new snapshot, so a failed cycle
//! leaves both the stored and the loaded state untouched.

use std::collections::HashSet;

use shelf_core::{
    CatalogLookupService, LibraryEntry, LibraryState, OwnedRecord, OwnershipSource,
    ReconciliationOutcome, ShelfError, StateStore, StorePlatform,
};
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::progress::ReconcileProgress;
use crate::reconcile::Reconciler;

/// Summary of one sync operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub platform: StorePlatform,
    /// Records reported by the ownership source (or considered for a retry).
    pub owned: usize,
    /// Records sent to the reconciler.
    pub delta: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Whether a new snapshot was written.
    pub persisted: bool,
}

impl SyncReport {
    fn empty(platform: StorePlatform, owned: usize) -> Self {
        Self {
            platform,
            owned,
            delta: 0,
            resolved: 0,
            unresolved: 0,
            persisted: false,
        }
    }
}

/// Counts produced by [`merge_outcomes`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub resolved: usize,
    pub unresolved: usize,
    pub entries_created: usize,
    pub links_added: usize,
}

/// Owns one user's library state for the duration of a session.
///
/// Sync cycles for the same user must not run concurrently; `&mut self` on
/// every mutating operation enforces that within one process.
pub struct LibrarySyncManager<S> {
    user_id: String,
    store: S,
    state: LibraryState,
}

impl<S: StateStore> LibrarySyncManager<S> {
    /// Load the stored library for `user_id`. A missing snapshot yields an
    /// empty library.
    pub fn load(user_id: impl Into<String>, store: S) -> Result<Self, SyncError> {
        let user_id = user_id.into();
        let state = match store.load(&user_id).map_err(SyncError::Store)? {
            Some(state) => {
                log::debug!(
                    "Loaded library for '{}': {} entries, {} unreconciled",
                    user_id,
                    state.entries.len(),
                    state.unreconciled.len()
                );
                state
            }
            None => {
                log::info!("No stored library for '{}', starting empty", user_id);
                LibraryState::default()
            }
        };
        Ok(Self {
            user_id,
            store,
            state,
        })
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    /// Fetch new ownership records from `source` and reconcile them.
    ///
    /// Records already linked to an entry or already pending as unreconciled
    /// are skipped. When nothing is new the catalog is never called and the
    /// stored state is left alone.
    pub async fn sync<O, C>(
        &mut self,
        source: &O,
        reconciler: &Reconciler<C>,
        cancel: &CancellationToken,
        progress: &dyn ReconcileProgress,
    ) -> Result<SyncReport, SyncError>
    where
        O: OwnershipSource,
        C: CatalogLookupService,
    {
        let platform = source.platform();

        // Build the known-id index while the ownership list is in flight.
        let fetch = async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ShelfError::Cancelled),
                result = source.get_owned_records() => result,
            }
        };
        let (owned, known) = tokio::join!(fetch, async {
            self.state.known_source_ids(platform)
        });
        let owned = owned.map_err(SyncError::ownership)?;
        let owned_count = owned.len();

        let delta = compute_delta(platform, owned, &known);
        if delta.is_empty() {
            log::info!(
                "Library for '{}' is up to date ({} games owned on {})",
                self.user_id,
                owned_count,
                platform
            );
            return Ok(SyncReport::empty(platform, owned_count));
        }
        log::info!(
            "{} new {} records for '{}'",
            delta.len(),
            platform,
            self.user_id
        );

        let delta_count = delta.len();
        let outcomes = reconciler
            .reconcile(delta, cancel, progress)
            .await
            .map_err(SyncError::catalog)?;

        let mut next = self.state.clone();
        let stats = merge_outcomes(&mut next, outcomes);
        self.persist(next)?;

        Ok(SyncReport {
            platform,
            owned: owned_count,
            delta: delta_count,
            resolved: stats.resolved,
            unresolved: stats.unresolved,
            persisted: true,
        })
    }

    /// Run the reconciler again over the records of `platform` that are still
    /// unreconciled. Persists only when at least one of them resolved.
    pub async fn retry_unreconciled<C: CatalogLookupService>(
        &mut self,
        platform: StorePlatform,
        reconciler: &Reconciler<C>,
        cancel: &CancellationToken,
        progress: &dyn ReconcileProgress,
    ) -> Result<SyncReport, SyncError> {
        let pending: Vec<OwnedRecord> = self.state.unreconciled_on(platform).cloned().collect();
        let pending_count = pending.len();
        if pending.is_empty() {
            return Ok(SyncReport::empty(platform, 0));
        }

        let outcomes = reconciler
            .reconcile(pending, cancel, progress)
            .await
            .map_err(SyncError::catalog)?;

        let mut next = self.state.clone();
        let stats = merge_outcomes(&mut next, outcomes);
        let persisted = stats.resolved > 0;
        if persisted {
            self.persist(next)?;
        }

        Ok(SyncReport {
            platform,
            owned: pending_count,
            delta: pending_count,
            resolved: stats.resolved,
            unresolved: stats.unresolved,
            persisted,
        })
    }

    /// Resolve one unreconciled record to an explicitly chosen catalog game.
    pub async fn manual_match<C: CatalogLookupService>(
        &mut self,
        platform: StorePlatform,
        source_id: i64,
        catalog_id: u64,
        reconciler: &Reconciler<C>,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let record = self
            .state
            .unreconciled_on(platform)
            .find(|r| r.source_id == source_id)
            .cloned()
            .ok_or(SyncError::UnknownRecord {
                platform,
                source_id,
            })?;

        let game = reconciler
            .resolve_by_id(catalog_id, cancel)
            .await
            .map_err(SyncError::catalog)?;
        log::info!(
            "Matched '{}' ({} {}) to '{}' ({})",
            record.title,
            platform,
            source_id,
            game.candidate.title,
            catalog_id
        );

        let mut next = self.state.clone();
        let stats = merge_outcomes(&mut next, vec![ReconciliationOutcome::Resolved { record, game }]);
        self.persist(next)?;

        Ok(SyncReport {
            platform,
            owned: 1,
            delta: 1,
            resolved: stats.resolved,
            unresolved: 0,
            persisted: true,
        })
    }

    fn persist(&mut self, next: LibraryState) -> Result<(), SyncError> {
        self.store
            .save(&self.user_id, &next)
            .map_err(SyncError::Store)?;
        log::debug!(
            "Saved library for '{}': {} entries, {} unreconciled",
            self.user_id,
            next.entries.len(),
            next.unreconciled.len()
        );
        self.state = next;
        Ok(())
    }
}

/// Records of `platform` whose source id is not in `known`, without
/// duplicates, in ownership-list order.
pub fn compute_delta(
    platform: StorePlatform,
    owned: Vec<OwnedRecord>,
    known: &HashSet<i64>,
) -> Vec<OwnedRecord> {
    let mut seen = HashSet::new();
    owned
        .into_iter()
        .filter(|record| {
            if record.platform != platform {
                log::warn!(
                    "Ignoring {} record '{}' reported by the {} source",
                    record.platform,
                    record.title,
                    platform
                );
                return false;
            }
            !known.contains(&record.source_id) && seen.insert(record.source_id)
        })
        .collect()
}

/// Merge reconciliation outcomes into `state`.
///
/// A resolved record becomes a new entry, or an extra ownership link when an
/// entry with the same catalog id already exists. It is also removed from the
/// unreconciled list if it was pending there. An unresolved record is added to
/// the unreconciled list unless it is already pending.
pub fn merge_outcomes(
    state: &mut LibraryState,
    outcomes: Vec<ReconciliationOutcome>,
) -> MergeStats {
    let mut stats = MergeStats::default();

    for outcome in outcomes {
        match outcome {
            ReconciliationOutcome::Resolved { record, game } => {
                stats.resolved += 1;
                state.unreconciled.retain(|r| !r.same_source(&record));

                let link = record.link();
                match state.entry_mut(game.candidate.catalog_id) {
                    Some(entry) => {
                        if entry.add_link(link) {
                            stats.links_added += 1;
                        }
                    }
                    None => {
                        state.entries.push(LibraryEntry::from_resolved(game, link));
                        stats.entries_created += 1;
                    }
                }
            }
            ReconciliationOutcome::Unresolved { record } => {
                stats.unresolved += 1;
                if !state.unreconciled.iter().any(|r| r.same_source(&record)) {
                    state.unreconciled.push(record);
                }
            }
        }
    }

    stats
}
