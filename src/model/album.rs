//! Album entity.

use std::fmt;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use super::tag::{Audience, Genre, Tag};
use super::{EntityInput, parse_id_from_slug, sanitize_name};
use crate::api::{Api, ApiError, query, value_as_u64};
use crate::pagination;

/// A picture set or manga chapter.
///
/// Built from an id, a site URL or a pre-fetched payload. The payload is
/// the source of truth; `content_urls` is the only field that needs extra
/// requests, and it is fetched at most once per instance.
#[derive(Debug, Clone)]
pub struct Album {
    id: u64,
    json: Value,
    url: String,
    api: Api,
    sanitized_name: OnceLock<String>,
    tags: OnceLock<Vec<Tag>>,
    genres: OnceLock<Vec<Genre>>,
    audiences: OnceLock<Vec<Audience>>,
    content_urls: OnceCell<Vec<Option<String>>>,
}

impl Album {
    /// Resolves an album, fetching its detail payload unless one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no usable payload can be obtained,
    /// whatever the underlying cause (bad slug, network failure, backend
    /// `MutationError`, malformed body).
    #[instrument(level = "debug", skip(api, input), fields(input = %input.describe()))]
    pub async fn resolve(api: &Api, input: EntityInput) -> Result<Self, ApiError> {
        let described = input.describe();
        let id = match input {
            EntityInput::FromPayload(payload) => return Self::from_payload(api, payload),
            EntityInput::ById(id) => id,
            EntityInput::ByUrl(url) => parse_id_from_slug(&url)
                .ok_or_else(|| ApiError::not_found(&described, "no numeric id in URL"))?,
        };

        debug!(album_id = id, "fetching album detail");
        let payload = api
            .call(&query::album_info(id), &["album", "get"])
            .await
            .map_err(|e| ApiError::not_found(&described, e.to_string()))?;
        Self::from_payload(api, payload).map_err(|e| match e {
            ApiError::NotFound { reason, .. } => ApiError::not_found(described, reason),
            other => other,
        })
    }

    /// Wraps a detail payload without any network call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the payload is not an object with a
    /// numeric `id`.
    pub fn from_payload(api: &Api, json: Value) -> Result<Self, ApiError> {
        if !json.is_object() {
            return Err(ApiError::not_found("payload", "album payload is not an object"));
        }
        let id = json
            .get("id")
            .and_then(value_as_u64)
            .ok_or_else(|| ApiError::not_found("payload", "album payload has no numeric id"))?;
        let url = api.absolute_url(json.get("url").and_then(Value::as_str).unwrap_or_default());
        Ok(Self {
            id,
            json,
            url,
            api: api.clone(),
            sanitized_name: OnceLock::new(),
            tags: OnceLock::new(),
            genres: OnceLock::new(),
            audiences: OnceLock::new(),
            content_urls: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The raw detail payload.
    #[must_use]
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Album title (empty if the payload lacks one).
    #[must_use]
    pub fn name(&self) -> &str {
        self.str_field("title").unwrap_or_default()
    }

    /// Title made safe for use as a directory name.
    #[must_use]
    pub fn sanitized_name(&self) -> &str {
        self.sanitized_name.get_or_init(|| sanitize_name(self.name()))
    }

    /// Absolute page URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute archive download URL, if the payload has one.
    #[must_use]
    pub fn download_url(&self) -> Option<String> {
        self.str_field("download_url")
            .map(|path| self.api.absolute_url(path))
    }

    /// Cover image URL.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.json.get("cover")?.get("url")?.as_str()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Number of still pictures.
    #[must_use]
    pub fn picture_count(&self) -> u64 {
        self.json.get("number_of_pictures").and_then(value_as_u64).unwrap_or(0)
    }

    /// Number of animated pictures.
    #[must_use]
    pub fn animated_count(&self) -> u64 {
        self.json
            .get("number_of_animated_pictures")
            .and_then(value_as_u64)
            .unwrap_or(0)
    }

    /// True for manga chapters, false for picture sets.
    #[must_use]
    pub fn is_manga(&self) -> bool {
        self.json.get("is_manga").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Content category title such as `Hentai` or `Real People`.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.json.get("content")?.get("title")?.as_str()
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        self.tags.get_or_init(|| parse_list(&self.json, "tags", self.id))
    }

    #[must_use]
    pub fn genres(&self) -> &[Genre] {
        self.genres.get_or_init(|| parse_list(&self.json, "genres", self.id))
    }

    #[must_use]
    pub fn audiences(&self) -> &[Audience] {
        self.audiences
            .get_or_init(|| parse_list(&self.json, "audiences", self.id))
    }

    /// Display names of `Artist` tags.
    #[must_use]
    pub fn artists(&self) -> Vec<String> {
        self.names_in_category("Artist")
    }

    /// Display names of `Character` tags.
    #[must_use]
    pub fn characters(&self) -> Vec<String> {
        self.names_in_category("Character")
    }

    /// Display names of `Parody` tags.
    #[must_use]
    pub fn parodies(&self) -> Vec<String> {
        self.names_in_category("Parody")
    }

    /// Whether the album carries the ongoing marker tag (only manga do).
    #[must_use]
    pub fn ongoing(&self) -> bool {
        self.tags().contains(&Tag::ongoing())
    }

    /// Whether the album has any content at all.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.picture_count() + self.animated_count() > 0
    }

    /// Original-resolution URLs of every picture, in album order.
    ///
    /// One slot per listing item; `None` marks a picture the listing gave no
    /// original URL for. The first call walks the picture listing; later calls return the
    /// cached result.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if any listing page cannot be fetched. Nothing is
    /// cached in that case, so a later call retries.
    pub async fn content_urls(&self) -> Result<&[Option<String>], ApiError> {
        let urls = self
            .content_urls
            .get_or_try_init(|| pagination::album_content_urls(&self.api, self.id))
            .await?;
        Ok(urls.as_slice())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.json.get(key).and_then(Value::as_str)
    }

    fn names_in_category(&self, category: &str) -> Vec<String> {
        self.tags()
            .iter()
            .filter(|tag| tag.has_category(category))
            .map(Tag::display_name)
            .collect()
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes `json[key]` as a list, dropping entries that do not decode.
pub(super) fn parse_list<T: DeserializeOwned>(json: &Value, key: &str, entity_id: u64) -> Vec<T> {
    let Some(entries) = json.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(item) => Some(item),
            Err(error) => {
                warn!(entity_id, field = key, %error, "skipping undecodable entry");
                None
            }
        })
        .collect()
}
