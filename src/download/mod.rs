//! Download engine for album pictures and video files.
//!
//! # Features
//!
//! - Streaming writes (bodies never held in memory)
//! - Resumable batches: items already on disk are not fetched again
//! - Per-item failure containment with zero-byte `_SKIPPED` markers
//! - Extension chosen from the response Content-Type
//! - Content-Length verification for videos
//! - Optional progress reporter and cancel flag

mod engine;
mod error;
mod filename;
mod progress;

pub use engine::{AlbumDownload, DownloadEngine, ItemOutcome, VideoDownload};
pub use error::DownloadError;
pub use filename::SKIPPED_SUFFIX;
pub use progress::{NoProgress, ProgressReporter};
