//! Reconciliation progress reporting.

use shelf_core::ReconciliationOutcome;

/// Trait for receiving reconciliation progress updates.
///
/// Callbacks may be invoked from whichever task finished a record, so
/// implementations must be `Sync`.
pub trait ReconcileProgress: Sync {
    /// Called once before any lookup, with the batch size.
    fn on_start(&self, total: usize);

    /// Called after each record has been resolved or given up on.
    fn on_outcome(&self, done: usize, total: usize, outcome: &ReconciliationOutcome);

    /// Called when the whole batch is finished.
    fn on_complete(&self, resolved: usize, unresolved: usize);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ReconcileProgress for SilentProgress {
    fn on_start(&self, _total: usize) {}
    fn on_outcome(&self, _done: usize, _total: usize, _outcome: &ReconciliationOutcome) {}
    fn on_complete(&self, _resolved: usize, _unresolved: usize) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ReconcileProgress for LogProgress {
    fn on_start(&self, total: usize) {
        log::info!("Reconciling {} records", total);
    }

    fn on_outcome(&self, done: usize, total: usize, outcome: &ReconciliationOutcome) {
        match outcome {
            ReconciliationOutcome::Resolved { record, game } => log::info!(
                "  [{}/{}] '{}' -> '{}' ({})",
                done,
                total,
                record.title,
                game.candidate.title,
                game.candidate.catalog_id
            ),
            ReconciliationOutcome::Unresolved { record } => {
                log::info!("  [{}/{}] '{}' unresolved", done, total, record.title)
            }
        }
    }

    fn on_complete(&self, resolved: usize, unresolved: usize) {
        log::info!("Reconciled {} records, {} unresolved", resolved, unresolved);
    }
}
