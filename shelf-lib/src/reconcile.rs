//! Match owned records against the game catalog.
//!
//! Each record is looked up by title, candidates are ranked by edit distance,
//! and the winner is enriched with cover, franchise and collection details.
//! Lookups for different records run concurrently, bounded by
//! `max_workers`; every catalog call first takes a slot from the shared
//! [`RateLimiter`].
//!
//! Failures are contained per record: a failed title search leaves the record
//! unresolved, a failed enrichment leaves that one field empty. Only
//! cancellation aborts the batch.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt, TryStreamExt};
use shelf_core::{
    CatalogCandidate, CatalogLookupService, Collection, Cover, Franchise, OwnedRecord,
    ReconciliationOutcome, ResolvedGame, ShelfError,
};
use tokio_util::sync::CancellationToken;

use crate::progress::ReconcileProgress;
use crate::rate_limiter::RateLimiter;
use crate::scorer;

/// Default number of records looked up concurrently.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Resolves owned records to catalog games.
pub struct Reconciler<C> {
    catalog: C,
    limiter: Arc<RateLimiter>,
    max_workers: usize,
}

impl<C: CatalogLookupService> Reconciler<C> {
    pub fn new(catalog: C, limiter: Arc<RateLimiter>) -> Self {
        Self {
            catalog,
            limiter,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Set the number of records processed concurrently (at least one).
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Reconcile a batch of records.
    ///
    /// Returns exactly one outcome per input record, in input order. The only
    /// error is `ShelfError::Cancelled`, in which case no outcomes are
    /// returned at all.
    pub async fn reconcile(
        &self,
        records: Vec<OwnedRecord>,
        cancel: &CancellationToken,
        progress: &dyn ReconcileProgress,
    ) -> Result<Vec<ReconciliationOutcome>, ShelfError> {
        let total = records.len();
        progress.on_start(total);
        log::debug!(
            "Reconciling {} records ({} workers, {} qps)",
            total,
            self.max_workers,
            self.limiter.qps()
        );

        let done = AtomicUsize::new(0);
        let done = &done;

        let outcomes: Vec<ReconciliationOutcome> = stream::iter(records)
            .map(|record| async move {
                let outcome = self.reconcile_record(record, cancel).await?;
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                progress.on_outcome(n, total, &outcome);
                Ok::<_, ShelfError>(outcome)
            })
            .buffered(self.max_workers)
            .try_collect()
            .await?;

        let resolved = outcomes.iter().filter(|o| o.is_resolved()).count();
        progress.on_complete(resolved, total - resolved);
        Ok(outcomes)
    }

    /// Look up a game by explicit catalog id and enrich it.
    ///
    /// Unlike title reconciliation, lookup failures are returned to the
    /// caller; an unknown id is `ShelfError::NotFound`.
    pub async fn resolve_by_id(
        &self,
        catalog_id: u64,
        cancel: &CancellationToken,
    ) -> Result<ResolvedGame, ShelfError> {
        let candidate = self
            .call(cancel, self.catalog.get_game(catalog_id))
            .await?
            .ok_or_else(|| ShelfError::not_found(format!("catalog id {}", catalog_id)))?;
        self.enrich(candidate, cancel).await
    }

    async fn reconcile_record(
        &self,
        record: OwnedRecord,
        cancel: &CancellationToken,
    ) -> Result<ReconciliationOutcome, ShelfError> {
        let candidates = match self
            .call(cancel, self.catalog.search_by_title(&record.title))
            .await
        {
            Ok(candidates) => candidates,
            Err(ShelfError::Cancelled) => return Err(ShelfError::Cancelled),
            Err(e) => {
                log::warn!(
                    "Catalog search failed for '{}' ({} {}): {}",
                    record.title,
                    record.platform,
                    record.source_id,
                    e
                );
                return Ok(ReconciliationOutcome::Unresolved { record });
            }
        };

        let Some(winner) = scorer::pick_winner(&record.title, candidates) else {
            log::debug!("No catalog candidates for '{}'", record.title);
            return Ok(ReconciliationOutcome::Unresolved { record });
        };
        log::debug!(
            "'{}' matched '{}' ({}) with distance {}",
            record.title,
            winner.candidate.title,
            winner.candidate.catalog_id,
            winner.score
        );

        let game = self.enrich(winner.candidate, cancel).await?;
        Ok(ReconciliationOutcome::Resolved { record, game })
    }

    /// Attach cover, franchise and collection details to a winner.
    ///
    /// The three lookups run concurrently and are each best-effort.
    async fn enrich(
        &self,
        candidate: CatalogCandidate,
        cancel: &CancellationToken,
    ) -> Result<ResolvedGame, ShelfError> {
        let (cover, franchises, collection) = tokio::join!(
            self.fetch_cover(&candidate, cancel),
            self.fetch_franchises(&candidate, cancel),
            self.fetch_collection(&candidate, cancel),
        );

        Ok(ResolvedGame {
            cover: cover?,
            franchises: franchises?.unwrap_or_default(),
            collection: collection?,
            candidate,
        })
    }

    async fn fetch_cover(
        &self,
        candidate: &CatalogCandidate,
        cancel: &CancellationToken,
    ) -> Result<Option<Cover>, ShelfError> {
        let Some(cover_id) = candidate.cover_id else {
            return Ok(None);
        };
        best_effort(
            self.call(cancel, self.catalog.get_cover(cover_id)).await,
            "cover",
            candidate,
        )
    }

    async fn fetch_franchises(
        &self,
        candidate: &CatalogCandidate,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<Franchise>>, ShelfError> {
        if candidate.franchise_ids.is_empty() {
            return Ok(None);
        }
        best_effort(
            self.call(cancel, self.catalog.get_franchises(&candidate.franchise_ids))
                .await
                .map(Some),
            "franchises",
            candidate,
        )
    }

    async fn fetch_collection(
        &self,
        candidate: &CatalogCandidate,
        cancel: &CancellationToken,
    ) -> Result<Option<Collection>, ShelfError> {
        let Some(collection_id) = candidate.collection_id else {
            return Ok(None);
        };
        best_effort(
            self.call(cancel, self.catalog.get_collection(collection_id))
                .await,
            "collection",
            candidate,
        )
    }

    /// Take a rate limiter slot, then run one catalog call unless the batch
    /// is cancelled first.
    async fn call<T>(
        &self,
        cancel: &CancellationToken,
        call: impl Future<Output = Result<T, ShelfError>>,
    ) -> Result<T, ShelfError> {
        self.limiter.wait(cancel).await?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ShelfError::Cancelled),
            result = call => result,
        }
    }
}

/// Degrade a failed enrichment lookup to "no value". Cancellation still
/// propagates.
fn best_effort<T>(
    result: Result<Option<T>, ShelfError>,
    what: &str,
    candidate: &CatalogCandidate,
) -> Result<Option<T>, ShelfError> {
    match result {
        Ok(value) => Ok(value),
        Err(ShelfError::Cancelled) => Err(ShelfError::Cancelled),
        Err(e) => {
            log::warn!(
                "Skipping {} for '{}' ({}): {}",
                what,
                candidate.title,
                candidate.catalog_id,
                e
            );
            Ok(None)
        }
    }
}
