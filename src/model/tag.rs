//! Tags, genres and audiences attached to albums and videos.

use serde::{Deserialize, Serialize};

use super::{sanitize_name, title_case};
use crate::api::lenient_string;

/// A categorized tag, e.g. `Artist: some name`.
///
/// Equality compares every field, which is what the ongoing-marker check
/// relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id (the site sends it as a string).
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Raw `Category: Value` text.
    #[serde(default)]
    pub text: String,
    /// Category such as `Artist`, `Character` or `Parody`; absent for plain tags.
    #[serde(default)]
    pub category: Option<String>,
    /// Site-relative tag URL.
    #[serde(default)]
    pub url: String,
}

impl Tag {
    /// Creates a tag from its fields.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: Option<&str>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.map(str::to_string),
            url: url.into(),
        }
    }

    /// The marker tag the site puts on manga that is still being published.
    #[must_use]
    pub fn ongoing() -> Self {
        Self::new("1895669", "ongoing", None, "/tags/ongoing/")
    }

    /// The value part of the text, trimmed and title-cased.
    #[must_use]
    pub fn display_name(&self) -> String {
        let value = self.text.rsplit(':').next().unwrap_or_default();
        title_case(value.trim())
    }

    /// The raw `Category: Value` text.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.text
    }

    /// [`display_name`](Self::display_name) made safe for use as a path component.
    #[must_use]
    pub fn sanitized_name(&self) -> String {
        sanitize_name(&self.display_name())
    }

    /// `#` followed by the sanitized name with spaces and hyphens as underscores.
    #[must_use]
    pub fn hashtag(&self) -> String {
        format!("#{}", self.sanitized_name().replace([' ', '-'], "_"))
    }

    pub(crate) fn has_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }
}

/// A genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Genre {
    /// The genre title, trimmed.
    #[must_use]
    pub fn name(&self) -> &str {
        self.title.trim()
    }

    #[must_use]
    pub fn sanitized_name(&self) -> String {
        sanitize_name(self.name())
    }
}

/// Intended audience of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Audience {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_name_takes_text_after_last_colon() {
        let tag = Tag::new("1", "Artist: some ARTIST ", Some("Artist"), "/tags/a/");
        assert_eq!(tag.display_name(), "Some Artist");
        assert_eq!(tag.full_name(), "Artist: some ARTIST ");

        let nested = Tag::new("2", "Series: Re:Zero", Some("Parody"), "/tags/b/");
        assert_eq!(nested.display_name(), "Zero");
    }

    #[test]
    fn test_hashtag_replaces_spaces_and_hyphens() {
        let tag = Tag::new("1", "Character: mary-jane watson", Some("Character"), "/t/");
        assert_eq!(tag.hashtag(), "#Mary_Jane_Watson");
    }

    #[test]
    fn test_sanitized_name_has_no_separators() {
        let tag = Tag::new("1", "Parody: fate/stay night", Some("Parody"), "/t/");
        let name = tag.sanitized_name();
        assert!(!name.contains('/'));
        assert_eq!(sanitize_name(&name), name);
    }

    #[test]
    fn test_tag_deserializes_numeric_id_and_null_category() {
        let tag: Tag = serde_json::from_value(json!({
            "id": 1_895_669, "text": "ongoing", "category": null, "url": "/tags/ongoing/"
        }))
        .unwrap();
        assert_eq!(tag, Tag::ongoing());
    }

    #[test]
    fn test_genre_name_comes_from_title() {
        let genre: Genre =
            serde_json::from_value(json!({"id": 3, "title": " Yuri ", "url": "/genres/yuri/"}))
                .unwrap();
        assert_eq!(genre.name(), "Yuri");
        assert_eq!(genre.sanitized_name(), "Yuri");
    }
}
