//! Progress bar for album and video downloads.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use luscious_core::{ItemOutcome, ProgressReporter};

/// Whether a progress bar should be drawn.
pub(crate) fn should_use_bar(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

/// Draws one bar per batch on stderr.
#[derive(Debug, Default)]
pub(crate) struct BarReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter for BarReporter {
    fn batch_started(&self, name: &str, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(name.to_string());
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn item_finished(&self, _index: usize, _total: usize, outcome: &ItemOutcome) {
        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            if outcome.is_skipped() {
                bar.println(format!("skipped {}", outcome.path().display()));
            }
            bar.inc(1);
        }
    }

    fn batch_finished(&self, _name: &str) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            bar.finish_and_clear();
        }
    }
}
