//! Domain model: albums, videos and their categorical metadata.
//!
//! Entities wrap the raw JSON payload the API returned and derive every
//! accessor from it. Derived values are memoized per instance; recomputing
//! them would yield the same result, so the caches are purely an
//! optimization.

mod album;
mod tag;
mod video;

use serde_json::Value;

pub use album::Album;
pub use tag::{Audience, Genre, Tag};
pub use video::{Video, VideoQuality};

/// The ways an entity can be requested.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityInput {
    /// Numeric id; triggers one detail fetch.
    ById(u64),
    /// Site URL or slug such as `.../animated-gifs_374481/`; triggers one detail fetch.
    ByUrl(String),
    /// Pre-fetched detail payload; no network call.
    FromPayload(Value),
}

impl EntityInput {
    /// Short description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::ById(id) => format!("id {id}"),
            Self::ByUrl(url) => format!("url {url}"),
            Self::FromPayload(_) => "payload".to_string(),
        }
    }
}

impl From<u64> for EntityInput {
    fn from(id: u64) -> Self {
        Self::ById(id)
    }
}

impl From<&str> for EntityInput {
    fn from(url: &str) -> Self {
        Self::ByUrl(url.to_string())
    }
}

impl From<String> for EntityInput {
    fn from(url: String) -> Self {
        Self::ByUrl(url)
    }
}

impl From<Value> for EntityInput {
    fn from(payload: Value) -> Self {
        Self::FromPayload(payload)
    }
}

/// Extracts the numeric id from a slug URL.
///
/// Takes the text after the last `_` and drops its final character, which
/// matches the one URL shape the site uses (`/albums/some-title_374481/`).
/// A URL without the trailing character loses its last digit, and one
/// without `_` yields `None`.
#[must_use]
pub fn parse_id_from_slug(url: &str) -> Option<u64> {
    let (_, tail) = url.rsplit_once('_')?;
    let mut chars = tail.chars();
    chars.next_back()?;
    chars.as_str().parse().ok()
}

/// Makes a name safe to use as a single path component.
///
/// Separators, NUL, control characters and characters reserved on common
/// filesystems become `_`; trailing dots and surrounding whitespace are
/// trimmed. Applying it twice gives the same result as applying it once.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim().trim_end_matches(['.', ' ']).trim();
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Title-cases text: the first letter of every run of letters is upper-cased
/// and the rest lower-cased (`"big BREASTS"` becomes `"Big Breasts"`).
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_from_slug() {
        assert_eq!(parse_id_from_slug("foo-bar_374481/"), Some(374_481));
        assert_eq!(
            parse_id_from_slug("https://www.luscious.net/albums/animated-gifs_374481/"),
            Some(374_481)
        );
        assert_eq!(parse_id_from_slug("videos/dropout_episode_1_hq_11401/"), Some(11_401));
    }

    #[test]
    fn test_parse_id_from_slug_rejects_other_shapes() {
        assert_eq!(parse_id_from_slug("no-underscore/"), None);
        assert_eq!(parse_id_from_slug("trailing_/"), None);
        assert_eq!(parse_id_from_slug("foo_abc/"), None);
        // no trailing character: the last digit is dropped
        assert_eq!(parse_id_from_slug("foo_1234"), Some(123));
    }

    #[test]
    fn test_sanitize_name_removes_separators_and_nul() {
        let cleaned = sanitize_name("a/b\\c\0d:e");
        assert!(!cleaned.contains('/'));
        assert!(!cleaned.contains('\\'));
        assert!(!cleaned.contains('\0'));
        assert_eq!(cleaned, "a_b_c_d_e");
    }

    #[test]
    fn test_sanitize_name_is_idempotent() {
        for input in ["  ..  ", "name. . ", "a/b", "", "Fate/Grand Order: Part 2.", "\u{7f}x"] {
            let once = sanitize_name(input);
            assert_eq!(sanitize_name(&once), once, "input {input:?}");
            assert!(!once.is_empty());
        }
    }

    #[test]
    fn test_sanitize_name_dot_names_become_placeholder() {
        assert_eq!(sanitize_name(".."), "_");
        assert_eq!(sanitize_name("."), "_");
        assert_eq!(sanitize_name("   "), "_");
    }

    #[test]
    fn test_title_case_matches_word_runs() {
        assert_eq!(title_case("big BREASTS"), "Big Breasts");
        assert_eq!(title_case("they're"), "They'Re");
        assert_eq!(title_case("1st place"), "1St Place");
        assert_eq!(title_case("x-ray"), "X-Ray");
    }

    #[test]
    fn test_entity_input_conversions() {
        assert_eq!(EntityInput::from(5), EntityInput::ById(5));
        assert_eq!(EntityInput::from("a_1/"), EntityInput::ByUrl("a_1/".to_string()));
        assert!(matches!(
            EntityInput::from(serde_json::json!({"id": 1})),
            EntityInput::FromPayload(_)
        ));
    }
}
