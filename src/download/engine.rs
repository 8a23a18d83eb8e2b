//! Sequential download engine for albums and videos.
//!
//! Each item goes through the same steps: compute its stem, skip it if a
//! file for that stem is already present, otherwise GET it and stream the
//! body to `<stem><ext>`. A failed item leaves a zero-byte `<stem>_SKIPPED`
//! marker and the batch moves on.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use luscious_core::{Api, ClientConfig, DownloadEngine, EntityInput, HttpClient};
//! use luscious_core::model::Album;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let client = HttpClient::new(&config)?;
//! let api = Api::new(client.clone(), config.endpoints.clone());
//! let album = Album::resolve(&api, EntityInput::ById(374_481)).await?;
//! let result = DownloadEngine::new(client)
//!     .download_album(&album, Path::new("./downloads"))
//!     .await?;
//! println!("{} items in {}", result.items.len(), result.dir.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::error::DownloadError;
use super::filename::{
    SKIPPED_SUFFIX, extension_from_content_type, manga_stem, matches_stem, sentinel_path,
    stem_from_url,
};
use super::progress::{NoProgress, ProgressReporter};
use crate::model::{Album, Video, VideoQuality};
use crate::transport::{HttpClient, TransportError};

/// What happened to one content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A file for this item was already present; nothing was fetched.
    Existing(PathBuf),
    /// The item was fetched and written to this path.
    Downloaded(PathBuf),
    /// No URL, a failed fetch, or a skip marker from an earlier run. The
    /// path is `dir/stem`, where the item would have been stored, on every
    /// run.
    Skipped(PathBuf),
}

impl ItemOutcome {
    /// The path recorded for this item.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Existing(path) | Self::Downloaded(path) | Self::Skipped(path) => path,
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Result of an album download: one outcome per content URL, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDownload {
    /// `<root>/<sanitized album name>`.
    pub dir: PathBuf,
    /// Outcomes in album order.
    pub items: Vec<ItemOutcome>,
}

impl AlbumDownload {
    /// Paths of every item, in album order.
    #[must_use]
    pub fn paths(&self) -> Vec<&Path> {
        self.items.iter().map(ItemOutcome::path).collect()
    }

    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Downloaded(_)))
    }

    #[must_use]
    pub fn existing(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Existing(_)))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(ItemOutcome::is_skipped)
    }

    fn count(&self, predicate: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|o| predicate(o)).count()
    }
}

/// Result of a video download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDownload {
    /// `<root>/<sanitized video name>`.
    pub dir: PathBuf,
    /// What happened to the file.
    pub outcome: ItemOutcome,
    /// The variant URL that was selected, if a fetch was attempted.
    pub source_url: Option<String>,
    /// Quality of the selected variant.
    pub quality: Option<VideoQuality>,
}

/// Downloads entity content one item at a time.
#[derive(Clone)]
pub struct DownloadEngine {
    client: HttpClient,
    progress: Arc<dyn ProgressReporter>,
    cancel: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("client", &self.client)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates an engine that reports nothing and cannot be cancelled.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            progress: Arc::new(NoProgress),
            cancel: None,
        }
    }

    /// Attaches a progress reporter.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Attaches a flag checked before every item; raising it stops the batch.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Downloads every picture of `album` into `<root>/<sanitized name>/`.
    ///
    /// Items already present are not fetched again, so re-running on the
    /// same directory performs no requests for finished items. A failed
    /// item becomes [`ItemOutcome::Skipped`]; the result always has one
    /// entry per content URL.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Io`] if the album directory cannot be created
    /// - [`DownloadError::Api`] if the picture listing cannot be fetched
    /// - [`DownloadError::Cancelled`] if the cancel flag is raised
    #[instrument(skip(self, album, root), fields(album_id = album.id(), root = %root.display()))]
    pub async fn download_album(
        &self,
        album: &Album,
        root: &Path,
    ) -> Result<AlbumDownload, DownloadError> {
        let dir = root.join(album.sanitized_name());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DownloadError::io(&dir, e))?;

        let urls = album.content_urls().await?;
        let total = urls.len();
        let picture_count = if album.picture_count() > 0 {
            album.picture_count()
        } else {
            total as u64
        };
        info!(dir = %dir.display(), total, manga = album.is_manga(), "downloading album");
        self.progress.batch_started(album.name(), total);

        let mut present = list_file_names(&dir).await;
        let mut items = Vec::with_capacity(total);

        for (index, url) in urls.iter().map(Option::as_deref).enumerate() {
            if self.is_cancelled() {
                warn!(completed = items.len(), total, "album download cancelled");
                self.progress.batch_finished(album.name());
                return Err(DownloadError::Cancelled {
                    completed: items.len(),
                });
            }
            self.progress.item_started(index, total, album.name());

            let stem = if album.is_manga() {
                manga_stem(album.sanitized_name(), index, picture_count)
            } else {
                url.map_or_else(|| format!("item_{index}"), |url| stem_from_url(url, index))
            };
            let outcome = self.fetch_item(url, &dir, &stem, &present, false).await;
            if let ItemOutcome::Downloaded(path) = &outcome
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                present.push(name.to_string());
            }

            self.progress.item_finished(index, total, &outcome);
            items.push(outcome);
        }

        let result = AlbumDownload { dir, items };
        info!(
            downloaded = result.downloaded(),
            existing = result.existing(),
            skipped = result.skipped(),
            "album download finished"
        );
        self.progress.batch_finished(album.name());
        Ok(result)
    }

    /// Downloads one variant of `video` into `<root>/<sanitized name>/`.
    ///
    /// The variant is chosen by [`Video::select_source`]. The written size
    /// is checked against Content-Length; a mismatch or any fetch failure
    /// degrades to [`ItemOutcome::Skipped`] instead of an error.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::NoSource`] if no variant exists at or below `quality`
    /// - [`DownloadError::Io`] if the video directory cannot be created
    /// - [`DownloadError::Cancelled`] if the cancel flag is already raised
    #[instrument(skip(self, video, root), fields(video_id = video.id(), root = %root.display()))]
    pub async fn download_video(
        &self,
        video: &Video,
        root: &Path,
        quality: VideoQuality,
    ) -> Result<VideoDownload, DownloadError> {
        if self.is_cancelled() {
            return Err(DownloadError::Cancelled { completed: 0 });
        }
        let (selected, url) =
            video
                .select_source(quality)
                .ok_or_else(|| DownloadError::NoSource {
                    name: video.name().to_string(),
                })?;
        if selected != quality {
            info!(requested = %quality, selected = %selected, "requested quality unavailable");
        }

        let dir = root.join(video.sanitized_name());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DownloadError::io(&dir, e))?;

        self.progress.batch_started(video.name(), 1);
        self.progress.item_started(0, 1, video.name());
        let present = list_file_names(&dir).await;
        let outcome = self
            .fetch_item(Some(url), &dir, video.sanitized_name(), &present, true)
            .await;
        self.progress.item_finished(0, 1, &outcome);
        self.progress.batch_finished(video.name());

        Ok(VideoDownload {
            dir,
            outcome,
            source_url: Some(url.to_string()),
            quality: Some(selected),
        })
    }

    /// Resolves one item to an outcome; never fails.
    ///
    /// An item without a URL, or whose fetch fails, gets a skip marker. A
    /// marker left by an earlier run is reported as skipped again under the
    /// same `dir/stem` path, so reruns yield the same path list.
    async fn fetch_item(
        &self,
        url: Option<&str>,
        dir: &Path,
        stem: &str,
        present: &[String],
        verify_length: bool,
    ) -> ItemOutcome {
        if let Some(name) = present.iter().find(|name| matches_stem(name, stem)) {
            if is_marker_for(name, stem) {
                debug!(stem, "item was skipped by an earlier run");
                return ItemOutcome::Skipped(dir.join(stem));
            }
            debug!(stem, existing = %name, "item already present");
            return ItemOutcome::Existing(dir.join(name));
        }

        let Some(url) = url else {
            warn!(stem, "item has no source URL; writing skip marker");
            return write_marker(dir, stem).await;
        };
        match self.fetch_to_file(url, dir, stem, verify_length).await {
            Ok(path) => ItemOutcome::Downloaded(path),
            Err(error) => {
                warn!(url, stem, error = %error, "item failed; writing skip marker");
                write_marker(dir, stem).await
            }
        }
    }

    async fn fetch_to_file(
        &self,
        url: &str,
        dir: &Path,
        stem: &str,
        verify_length: bool,
    ) -> Result<PathBuf, DownloadError> {
        let response = self.client.get(url).await?;
        let extension = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(".bin", extension_from_content_type);
        let expected = response.content_length();
        let path = dir.join(format!("{stem}{extension}"));

        let mut file = File::create(&path)
            .await
            .map_err(|e| DownloadError::io(&path, e))?;
        let written = match stream_to_file(&mut file, response, url, &path).await {
            Ok(written) => written,
            Err(error) => {
                debug!(path = %path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&path).await;
                return Err(error);
            }
        };

        if verify_length && let Some(expected) = expected.filter(|e| *e != written) {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(DownloadError::integrity(path, expected, written));
        }

        debug!(path = %path.display(), bytes = written, "item written");
        Ok(path)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Writes the zero-byte marker for `stem` and reports the item as skipped.
async fn write_marker(dir: &Path, stem: &str) -> ItemOutcome {
    let marker = sentinel_path(dir, stem);
    if let Err(io_error) = File::create(&marker).await {
        warn!(path = %marker.display(), error = %io_error, "could not write skip marker");
    }
    ItemOutcome::Skipped(dir.join(stem))
}

fn is_marker_for(file_name: &str, stem: &str) -> bool {
    file_name
        .strip_prefix(stem)
        .is_some_and(|rest| rest.starts_with(SKIPPED_SUFFIX))
}

/// Streams a response body to `file`, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TransportError::network(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;
    Ok(bytes_written)
}

/// Names of the files currently in `dir`; unreadable entries are ignored.
async fn list_file_names(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(error) => {
            warn!(dir = %dir.display(), %error, "could not list download directory");
            return names;
        }
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names
}
