//! Session facade: login, entity lookup, search, landing page and downloads.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::{
    AlbumSearch, Api, ApiError, LOGIN_FAILURE_PHRASE, SearchPage, SortOrder, VideoSearch, query,
    split_listing, value_as_u64,
};
use crate::config::ClientConfig;
use crate::download::{AlbumDownload, DownloadEngine, DownloadError, ProgressReporter, VideoDownload};
use crate::model::{Album, EntityInput, Video, VideoQuality};
use crate::transport::{HttpClient, TransportError};

/// One titled section of the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingSection {
    /// Section title, e.g. `Hentai Manga`.
    pub title: String,
    /// Album ids in display order.
    pub ids: Vec<u64>,
}

/// The site's front page, sections in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingPage {
    pub sections: Vec<LandingSection>,
}

impl LandingPage {
    /// Ids of the section titled `title`.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&[u64]> {
        self.sections
            .iter()
            .find(|section| section.title == title)
            .map(|section| section.ids.as_slice())
    }

    /// Section titles in display order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.title.as_str())
    }
}

/// Entry point of the library.
///
/// Holds one HTTP client (and therefore one cookie jar) shared by every
/// call, so logging in once authenticates later lookups and downloads.
/// Calls are issued one at a time; sharing a session between concurrent
/// tasks is not supported.
#[derive(Debug, Clone)]
pub struct Luscious {
    api: Api,
    engine: DownloadEngine,
}

impl Luscious {
    /// Builds a session from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client = HttpClient::new(&config)?;
        Ok(Self {
            engine: DownloadEngine::new(client.clone()),
            api: Api::new(client, config.endpoints),
        })
    }

    /// Reports download progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.engine = self.engine.with_progress(progress);
        self
    }

    /// Stops downloads between items once `cancel` is raised.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.engine = self.engine.with_cancel_flag(cancel);
        self
    }

    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    #[must_use]
    pub fn engine(&self) -> &DownloadEngine {
        &self.engine
    }

    /// Logs in with the site's account form.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::LoginFailed`] when the response carries the
    /// rejected-credentials message, or [`ApiError::Transport`] if the form
    /// cannot be posted.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let body = self
            .api
            .client()
            .post_form(
                &self.api.endpoints().login,
                &[("login", username), ("password", password), ("remember", "on")],
            )
            .await?;
        if body.contains(LOGIN_FAILURE_PHRASE) {
            warn!("login rejected");
            return Err(ApiError::LoginFailed {
                username: username.to_string(),
            });
        }
        info!("logged in");
        Ok(())
    }

    /// Resolves an album by id, URL or payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no usable payload can be obtained.
    pub async fn get_album(&self, input: impl Into<EntityInput>) -> Result<Album, ApiError> {
        Album::resolve(&self.api, input.into()).await
    }

    /// Resolves a video by id, URL or payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no usable payload can be obtained.
    pub async fn get_video(&self, input: impl Into<EntityInput>) -> Result<Video, ApiError> {
        Video::resolve(&self.api, input.into()).await
    }

    /// Searches albums and returns the matching ids.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a malformed listing.
    #[instrument(skip(self), fields(query = %search.query, page = search.page))]
    pub async fn search_album(&self, search: &AlbumSearch) -> Result<SearchPage<u64>, ApiError> {
        let request = query::album_search(search);
        let node = self.api.call(&request, &["album", "list"]).await?;
        Ok(listing_ids(split_listing(node, request.operation)?))
    }

    /// Searches albums and resolves every result, one detail fetch per id.
    ///
    /// # Errors
    ///
    /// Fails on the first id that cannot be resolved.
    pub async fn search_album_entities(
        &self,
        search: &AlbumSearch,
    ) -> Result<SearchPage<Album>, ApiError> {
        let page = self.search_album(search).await?;
        let mut albums = Vec::with_capacity(page.items.len());
        for id in &page.items {
            albums.push(self.get_album(*id).await?);
        }
        Ok(SearchPage {
            info: page.info,
            items: albums,
        })
    }

    /// Searches videos and returns the matching ids.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or a malformed listing.
    #[instrument(skip(self), fields(query = %search.query, page = search.page))]
    pub async fn search_video(&self, search: &VideoSearch) -> Result<SearchPage<u64>, ApiError> {
        let request = query::video_search(search);
        let node = self.api.call(&request, &["video", "list"]).await?;
        Ok(listing_ids(split_listing(node, request.operation)?))
    }

    /// Searches videos and resolves every result.
    ///
    /// # Errors
    ///
    /// Fails on the first id that cannot be resolved.
    pub async fn search_video_entities(
        &self,
        search: &VideoSearch,
    ) -> Result<SearchPage<Video>, ApiError> {
        let page = self.search_video(search).await?;
        let mut videos = Vec::with_capacity(page.items.len());
        for id in &page.items {
            videos.push(self.get_video(*id).await?);
        }
        Ok(SearchPage {
            info: page.info,
            items: videos,
        })
    }

    /// Fetches the front page with `limit` albums per section.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a `MutationError` answer
    /// or a response without sections.
    #[instrument(skip(self))]
    pub async fn landing_page(&self, limit: u32) -> Result<LandingPage, ApiError> {
        let request = query::landing_page(limit);
        let node = self
            .api
            .call(&request, &["landing_page_album", "frontpage"])
            .await?;
        let sections = node
            .get("sections")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::malformed(request.operation, "frontpage has no sections"))?;

        let sections = sections
            .iter()
            .map(|section| LandingSection {
                title: section
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                ids: section
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(item_id).collect())
                    .unwrap_or_default(),
            })
            .collect();
        Ok(LandingPage { sections })
    }

    /// Fetches the front page and resolves every album, section by section.
    ///
    /// # Errors
    ///
    /// Fails on the first album that cannot be resolved.
    pub async fn landing_page_albums(&self, limit: u32) -> Result<Vec<(String, Vec<Album>)>, ApiError> {
        let page = self.landing_page(limit).await?;
        let mut sections = Vec::with_capacity(page.sections.len());
        for section in page.sections {
            let mut albums = Vec::with_capacity(section.ids.len());
            for id in section.ids {
                albums.push(self.get_album(id).await?);
            }
            sections.push((section.title, albums));
        }
        Ok(sections)
    }

    /// Picks an id from the most recently interacted-with albums.
    ///
    /// This is not uniform over the catalogue: it samples the same bounded
    /// recent-activity window the site's own random button uses.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] if the listing is empty.
    pub async fn random_album_id(&self) -> Result<u64, ApiError> {
        let search = AlbumSearch::new("").display(SortOrder::DateLastInteraction);
        let page = self.search_album(&search).await?;
        let id = page
            .items
            .choose(&mut rand::thread_rng())
            .copied()
            .ok_or_else(|| ApiError::malformed("AlbumList", "recent listing is empty"))?;
        debug!(album_id = id, "picked random album");
        Ok(id)
    }

    /// Downloads an album's pictures under `root`.
    ///
    /// # Errors
    ///
    /// See [`DownloadEngine::download_album`].
    pub async fn download_album(
        &self,
        album: &Album,
        root: &Path,
    ) -> Result<AlbumDownload, DownloadError> {
        self.engine.download_album(album, root).await
    }

    /// Downloads a video under `root` at `quality` or the best lower one.
    ///
    /// # Errors
    ///
    /// See [`DownloadEngine::download_video`].
    pub async fn download_video(
        &self,
        video: &Video,
        root: &Path,
        quality: VideoQuality,
    ) -> Result<VideoDownload, DownloadError> {
        self.engine.download_video(video, root, quality).await
    }
}

fn item_id(item: &Value) -> Option<u64> {
    let id = item.get("id").and_then(value_as_u64);
    if id.is_none() {
        warn!(item = %item, "listing item has no numeric id; skipping");
    }
    id
}

fn listing_ids(page: SearchPage<Value>) -> SearchPage<u64> {
    page.filter_map(|item| item_id(&item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PageInfo;
    use serde_json::json;

    #[test]
    fn test_listing_ids_skips_items_without_id() {
        let page = SearchPage {
            info: PageInfo::default(),
            items: vec![json!({"id": "3"}), json!({"title": "x"}), json!({"id": 9})],
        };
        assert_eq!(listing_ids(page).items, vec![3, 9]);
    }

    #[test]
    fn test_landing_page_lookup_by_title() {
        let page = LandingPage {
            sections: vec![
                LandingSection {
                    title: "Hentai Manga".to_string(),
                    ids: vec![1, 2],
                },
                LandingSection {
                    title: "Porn Pictures".to_string(),
                    ids: vec![3],
                },
            ],
        };
        assert_eq!(page.get("Porn Pictures"), Some(&[3][..]));
        assert_eq!(page.get("Missing"), None);
        assert_eq!(page.titles().collect::<Vec<_>>(), vec!["Hentai Manga", "Porn Pictures"]);
    }
}
