//! Error types for the download module.
//!
//! Only failures that stop a whole batch surface here. A single item that
//! cannot be fetched is recorded as a skipped outcome instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::transport::TransportError;

/// Errors that abort an album or video download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// File system error (create directory, create file, write).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A media request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The album picture listing could not be fetched.
    #[error("could not list album content: {0}")]
    Api(#[from] ApiError),

    /// Downloaded size does not match the server's content length.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        /// The file that failed verification (already removed).
        path: PathBuf,
        /// Content-Length announced by the server.
        expected_bytes: u64,
        /// Bytes actually written.
        actual_bytes: u64,
    },

    /// The video has no URL at or below the requested quality.
    #[error("no downloadable source for {name}")]
    NoSource {
        /// Video name.
        name: String,
    },

    /// The cancel flag was raised between items.
    #[error("download cancelled after {completed} item(s)")]
    Cancelled {
        /// Items processed before cancellation.
        completed: usize,
    },
}

impl DownloadError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an integrity error.
    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let error = DownloadError::io(
            "/tmp/album/001.jpg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = error.to_string();
        assert!(msg.contains("/tmp/album/001.jpg"), "{msg}");
        assert!(msg.contains("denied"), "{msg}");
    }

    #[test]
    fn test_integrity_error_display() {
        let error = DownloadError::integrity("/tmp/v/clip.mp4", 1024, 512);
        let msg = error.to_string();
        assert!(msg.contains("expected 1024 bytes, got 512"), "{msg}");
    }

    #[test]
    fn test_transport_error_converts() {
        let error: DownloadError = TransportError::http_status("http://cdn/x.jpg", 404).into();
        assert!(error.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_cancelled_display() {
        let error = DownloadError::Cancelled { completed: 3 };
        assert_eq!(error.to_string(), "download cancelled after 3 item(s)");
    }
}
