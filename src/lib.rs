//! Luscious Core Library
//!
//! A client for the luscious.net members GraphQL API: login, album and
//! video lookup, search, the landing page, and resumable downloads of album
//! pictures and videos.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`transport`] - HTTP client with retry/backoff, cookies and proxy fallback
//! - [`api`] - Endpoints, GraphQL request builders and response decoding
//! - [`model`] - Album, Video, Tag and Genre entities
//! - [`pagination`] - Album picture listing walker
//! - [`download`] - Sequential download engine with skip markers
//! - [`session`] - The [`Luscious`] facade tying everything together
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use luscious_core::{ClientConfig, Luscious};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Luscious::new(ClientConfig::default())?;
//! let album = session.get_album("https://www.luscious.net/albums/animated-gifs_374481/").await?;
//! let result = session.download_album(&album, Path::new("./downloads")).await?;
//! println!("{}: {} skipped", album, result.skipped());
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod download;
pub mod model;
pub mod pagination;
pub mod session;
pub mod transport;
pub mod user_agent;

// Re-export commonly used types
pub use api::{
    AlbumSearch, AlbumType, Api, ApiError, ContentType, DEFAULT_LANDING_LIMIT, Endpoints,
    PageInfo, SearchPage, SortOrder, VideoSearch,
};
pub use config::ClientConfig;
pub use download::{
    AlbumDownload, DownloadEngine, DownloadError, ItemOutcome, NoProgress, ProgressReporter,
    SKIPPED_SUFFIX, VideoDownload,
};
pub use model::{Album, EntityInput, Genre, Tag, Video, VideoQuality};
pub use session::{LandingPage, LandingSection, Luscious};
pub use transport::{HttpClient, RetryPolicy, TransportError};
pub use user_agent::UserAgent;
