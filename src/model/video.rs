//! Video entity and resolution selection.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, instrument};

use super::album::parse_list;
use super::tag::{Audience, Genre, Tag};
use super::{EntityInput, parse_id_from_slug, sanitize_name};
use crate::api::{Api, ApiError, query, value_as_u64};

/// Payload keys of the four resolution variants, lowest first.
const VARIANT_KEYS: [&str; 4] = ["v240p", "v360p", "v720p", "v1080p"];

/// Requested video resolution, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VideoQuality {
    P240 = 0,
    P360 = 1,
    P720 = 2,
    #[default]
    P1080 = 3,
}

impl VideoQuality {
    /// Every quality, lowest first.
    pub const ALL: [Self; 4] = [Self::P240, Self::P360, Self::P720, Self::P1080];

    /// Position in [`Video::content_urls`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Vertical resolution in pixels.
    #[must_use]
    pub fn height(self) -> u32 {
        match self {
            Self::P240 => 240,
            Self::P360 => 360,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    /// Maps a resolution in pixels (240, 360, 720, 1080) to a quality.
    #[must_use]
    pub fn from_height(height: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.height() == height)
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

impl FromStr for VideoQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['p', 'P']);
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Self::from_height)
            .ok_or_else(|| format!("invalid video quality '{s}': expected 240, 360, 720 or 1080"))
    }
}

/// A single video with up to four resolution variants.
#[derive(Debug, Clone)]
pub struct Video {
    id: u64,
    json: Value,
    url: String,
    sanitized_name: OnceLock<String>,
    tags: OnceLock<Vec<Tag>>,
    genres: OnceLock<Vec<Genre>>,
    audiences: OnceLock<Vec<Audience>>,
}

impl Video {
    /// Resolves a video, fetching its detail payload unless one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no usable payload can be obtained.
    #[instrument(level = "debug", skip(api, input), fields(input = %input.describe()))]
    pub async fn resolve(api: &Api, input: EntityInput) -> Result<Self, ApiError> {
        let described = input.describe();
        let id = match input {
            EntityInput::FromPayload(payload) => return Self::from_payload(api, payload),
            EntityInput::ById(id) => id,
            EntityInput::ByUrl(url) => parse_id_from_slug(&url)
                .ok_or_else(|| ApiError::not_found(&described, "no numeric id in URL"))?,
        };

        debug!(video_id = id, "fetching video detail");
        let payload = api
            .call(&query::video_info(id), &["video", "get"])
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
            return Err(ApiError::not_found("payload", "video payload is not an object"));
        }
        let id = json
            .get("id")
            .and_then(value_as_u64)
            .ok_or_else(|| ApiError::not_found("payload", "video payload has no numeric id"))?;
        let url = api.absolute_url(json.get("url").and_then(Value::as_str).unwrap_or_default());
        Ok(Self {
            id,
            json,
            url,
            sanitized_name: OnceLock::new(),
            tags: OnceLock::new(),
            genres: OnceLock::new(),
            audiences: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn json(&self) -> &Value {
        &self.json
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.str_field("title").unwrap_or_default()
    }

    #[must_use]
    pub fn sanitized_name(&self) -> &str {
        self.sanitized_name.get_or_init(|| sanitize_name(self.name()))
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Poster image URL.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.str_field("poster_url")
    }

    #[must_use]
    pub fn subtitle_url(&self) -> Option<&str> {
        self.str_field("subtitle_url").filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

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

    /// A constructed video always has a payload.
    #[must_use]
    pub fn exists(&self) -> bool {
        true
    }

    /// The 240p, 360p, 720p and 1080p URLs; absent or empty variants are `None`.
    #[must_use]
    pub fn content_urls(&self) -> [Option<&str>; 4] {
        VARIANT_KEYS.map(|key| self.str_field(key).filter(|s| !s.is_empty()))
    }

    /// The URL of exactly `quality`, if present.
    #[must_use]
    pub fn content_url(&self, quality: VideoQuality) -> Option<&str> {
        self.content_urls()[quality.index()]
    }

    /// Picks the download source for `quality`.
    ///
    /// The exact variant wins when present. Otherwise variants `0..=quality`
    /// are scanned in ascending order and the last present one is kept, so
    /// the result is the highest available quality not above the request.
    #[must_use]
    pub fn select_source(&self, quality: VideoQuality) -> Option<(VideoQuality, &str)> {
        let urls = self.content_urls();
        if let Some(url) = urls[quality.index()] {
            return Some((quality, url));
        }
        let mut selected = None;
        for candidate in VideoQuality::ALL.into_iter().take(quality.index() + 1) {
            if let Some(url) = urls[candidate.index()] {
                selected = Some((candidate, url));
            }
        }
        selected
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.json.get(key).and_then(Value::as_str)
    }
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
