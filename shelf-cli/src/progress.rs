//! Terminal progress bar for reconciliation batches.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use shelf_lib::{LogProgress, ReconcileProgress, ReconciliationOutcome};

/// A progress bar on terminals, log lines otherwise.
pub(crate) fn reporter() -> Box<dyn ReconcileProgress> {
    if std::io::stderr().is_terminal() {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress)
    }
}

pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }
}

impl ReconcileProgress for BarProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(std::time::Duration::from_millis(100));
    }

    fn on_outcome(&self, done: usize, _total: usize, outcome: &ReconciliationOutcome) {
        self.bar.set_position(done as u64);
        match outcome {
            ReconciliationOutcome::Resolved { record, game } => {
                self.bar.set_message(format!(
                    "{} \u{2192} {}",
                    record.title, game.candidate.title
                ));
            }
            ReconciliationOutcome::Unresolved { record } => {
                self.bar.println(format!(
                    "  {} No match for '{}' ({})",
                    "?".if_supports_color(Stdout, |t| t.yellow()),
                    record.title,
                    record.source_id,
                ));
            }
        }
    }

    fn on_complete(&self, _resolved: usize, _unresolved: usize) {
        self.bar.finish_and_clear();
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        // Cancelled batches never reach on_complete.
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
