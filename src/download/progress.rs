//! Progress reporting hooks for the download engine.
//!
//! Reporters observe; they cannot alter control flow. Every hook has a
//! no-op default so an implementation only overrides what it displays.

use super::engine::ItemOutcome;

/// Receives per-item progress from [`DownloadEngine`](super::DownloadEngine).
///
/// Hooks are called inline on the download task and should return quickly.
pub trait ProgressReporter: Send + Sync {
    /// A batch of `total` items for `name` is starting.
    fn batch_started(&self, _name: &str, _total: usize) {}

    /// Item `index` (0-based) is about to be processed.
    fn item_started(&self, _index: usize, _total: usize, _name: &str) {}

    /// Item `index` finished with `outcome`.
    fn item_finished(&self, _index: usize, _total: usize, _outcome: &ItemOutcome) {}

    /// The batch ended, normally or through cancellation.
    fn batch_finished(&self, _name: &str) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
