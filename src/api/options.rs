//! Search option sets with explicit wire-value tables.
//!
//! Each enum maps one-to-one onto the token the site expects in its
//! listing filters. Parsing from user input goes through [`FromStr`], so
//! unknown tokens are rejected before a request is built.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rejected option token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}': expected one of {expected}")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseOptionError {
    fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The token sent on the wire.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseOptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| {
                        let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        ParseOptionError::new($kind, s, &expected)
                    })
            }
        }
    };
}

option_enum! {
    /// Listing sort order (`display` input field).
    SortOrder, "sort order" {
        /// Highest rated overall.
        RatingAllTime => "rating_all_time",
        /// Highest rated this week.
        Rating7Days => "rating_7_days",
        /// Highest rated in the last two weeks.
        Rating14Days => "rating_14_days",
        /// Highest rated this month.
        Rating30Days => "rating_30_days",
        /// Currently trending.
        DateTrending => "date_trending",
        /// Newest uploads first.
        DateNewest => "date_newest",
        /// Most recently interacted with.
        DateLastInteraction => "date_last_interaction",
    }
}

option_enum! {
    /// Album kind filter (`album_type`).
    AlbumType, "album type" {
        /// No restriction.
        All => "All",
        /// Manga chapters only.
        Manga => "Manga",
        /// Picture sets only.
        Pictures => "Pictures",
    }
}

option_enum! {
    /// Content category filter (`content_id`).
    ContentType, "content type" {
        /// No restriction.
        All => "0",
        /// Drawn content.
        Hentai => "1",
        /// Non-erotic content.
        NonErotic => "2",
        /// Photographs of real people.
        RealPeople => "3",
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::RatingAllTime
    }
}

impl Default for AlbumType {
    fn default() -> Self {
        Self::All
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::All
    }
}

/// Parameters of an album search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumSearch {
    /// Free-text query (may be empty).
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Sort order.
    pub display: SortOrder,
    /// Album kind filter.
    pub album_type: AlbumType,
    /// Content category filter.
    pub content: ContentType,
}

impl AlbumSearch {
    /// Search for `query` on page 1 with default filters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            display: SortOrder::default(),
            album_type: AlbumType::default(),
            content: ContentType::default(),
        }
    }

    /// Sets the page (clamped to at least 1).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn display(mut self, display: SortOrder) -> Self {
        self.display = display;
        self
    }

    /// Sets the album kind filter.
    #[must_use]
    pub fn album_type(mut self, album_type: AlbumType) -> Self {
        self.album_type = album_type;
        self
    }

    /// Sets the content category filter.
    #[must_use]
    pub fn content(mut self, content: ContentType) -> Self {
        self.content = content;
        self
    }
}

/// Parameters of a video search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSearch {
    /// Free-text query (may be empty).
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Sort order.
    pub display: SortOrder,
    /// Content category filter.
    pub content: ContentType,
}

impl VideoSearch {
    /// Search for `query` on page 1 with default filters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            display: SortOrder::default(),
            content: ContentType::default(),
        }
    }

    /// Sets the page (clamped to at least 1).
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn display(mut self, display: SortOrder) -> Self {
        self.display = display;
        self
    }

    /// Sets the content category filter.
    #[must_use]
    pub fn content(mut self, content: ContentType) -> Self {
        self.content = content;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_round_trips_through_wire_token() {
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>().unwrap(), *order);
        }
    }

    #[test]
    fn test_album_type_parse_is_case_insensitive() {
        assert_eq!("manga".parse::<AlbumType>().unwrap(), AlbumType::Manga);
        assert_eq!(" PICTURES ".parse::<AlbumType>().unwrap(), AlbumType::Pictures);
    }

    #[test]
    fn test_content_type_wire_codes() {
        assert_eq!(ContentType::All.as_str(), "0");
        assert_eq!(ContentType::RealPeople.to_string(), "3");
        assert_eq!("2".parse::<ContentType>().unwrap(), ContentType::NonErotic);
    }

    #[test]
    fn test_unknown_token_is_rejected_with_expected_list() {
        let err = "most_popular".parse::<SortOrder>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("most_popular"), "{msg}");
        assert!(msg.contains("rating_all_time"), "{msg}");
    }

    #[test]
    fn test_search_page_is_clamped() {
        assert_eq!(AlbumSearch::new("x").page(0).page, 1);
        assert_eq!(VideoSearch::new("x").page(0).page, 1);
        assert_eq!(AlbumSearch::new("x").page(3).page, 3);
    }
}
