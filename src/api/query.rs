//! GraphQL request documents for every operation the client issues.
//!
//! The builders are pure: they only shape `{query, variables}` and never
//! touch the network.

use serde::Serialize;
use serde_json::{Value, json};

use super::endpoints::AUDIENCE_IDS;
use super::options::{AlbumSearch, VideoSearch};

const ALBUM_INFO_QUERY: &str = r"query getAlbumInfo($id: ID!) {
    album {
        get(id: $id) {
            ... on Album { ...AlbumStandard }
            ... on MutationError { errors { code message } }
        }
    }
}
fragment AlbumStandard on Album {
    id title tags is_manga content genres cover description audiences
    number_of_pictures number_of_animated_pictures url download_url
}";

const VIDEO_INFO_QUERY: &str = r"query getVideoInfo($id: ID!) {
    video {
        get(id: $id) {
            ... on Video { ...VideoStandard }
            ... on MutationError { errors { code message } }
        }
    }
}
fragment VideoStandard on Video {
    id title tags content genres description audiences url poster_url subtitle_url
    v240p v360p v720p v1080p
}";

const ALBUM_PICTURES_QUERY: &str = r"query ListAlbumPictures($input: PictureListInput!) {
    picture {
        list(input: $input) {
            info { ...PageInfo }
            items { ...PicUrls }
        }
    }
}
fragment PageInfo on FacetCollectionInfo {
    page has_next_page has_previous_page total_items total_pages items_per_page url_complete
}
fragment PicUrls on Picture { url_to_original url_to_video url }";

const ALBUM_SEARCH_QUERY: &str = r"query AlbumList($input: AlbumListInput!) {
    album {
        list(input: $input) {
            info { ...PageInfo }
            items { ...AlbumMinimal }
        }
    }
}
fragment PageInfo on FacetCollectionInfo {
    page has_next_page has_previous_page total_items total_pages items_per_page url_complete
}
fragment AlbumMinimal on Album { __typename id title number_of_pictures number_of_animated_pictures }";

const VIDEO_SEARCH_QUERY: &str = r"query VideoList($input: VideoListInput!) {
    video {
        list(input: $input) {
            info { ...PageInfo }
            items { ...VideoMinimal }
        }
    }
}
fragment PageInfo on FacetCollectionInfo {
    page has_next_page has_previous_page total_items total_pages items_per_page url_complete
}
fragment VideoMinimal on Video { __typename id title }";

const LANDING_PAGE_QUERY: &str = r"query getLandingPage($limit: Int) {
    landing_page_album {
        frontpage(limit: $limit) {
            ... on LandingPage {
                sections {
                    ... on AlbumTopHits { title items { id title } }
                    ... on VideoTopHits { title }
                }
            }
            ... on MutationError { errors { code message } }
        }
    }
}";

/// A `{query, variables}` document ready to POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    /// Operation name, used for error context and logging only.
    #[serde(skip)]
    pub operation: &'static str,
    /// GraphQL document text.
    pub query: &'static str,
    /// Operation variables.
    pub variables: Value,
}

/// Album detail by id.
#[must_use]
pub fn album_info(album_id: u64) -> GraphqlRequest {
    GraphqlRequest {
        operation: "getAlbumInfo",
        query: ALBUM_INFO_QUERY,
        variables: json!({ "id": album_id.to_string() }),
    }
}

/// Video detail by id.
#[must_use]
pub fn video_info(video_id: u64) -> GraphqlRequest {
    GraphqlRequest {
        operation: "getVideoInfo",
        query: VIDEO_INFO_QUERY,
        variables: json!({ "id": video_id.to_string() }),
    }
}

/// One page of an album's pictures, in album order.
#[must_use]
pub fn album_pictures(album_id: u64, page: u32) -> GraphqlRequest {
    GraphqlRequest {
        operation: "ListAlbumPictures",
        query: ALBUM_PICTURES_QUERY,
        variables: json!({
            "input": {
                "display": "position",
                "filters": [{ "name": "album_id", "value": album_id.to_string() }],
                "page": page,
            }
        }),
    }
}

/// One page of album search results.
#[must_use]
pub fn album_search(search: &AlbumSearch) -> GraphqlRequest {
    GraphqlRequest {
        operation: "AlbumList",
        query: ALBUM_SEARCH_QUERY,
        variables: json!({
            "input": {
                "display": search.display.as_str(),
                "filters": [
                    filter("restrict_genres", "loose"),
                    filter("audience_ids", AUDIENCE_IDS),
                    filter("album_type", search.album_type.as_str()),
                    filter("search_query", &search.query),
                    filter("content_id", search.content.as_str()),
                ],
                "page": search.page,
            }
        }),
    }
}

/// One page of video search results.
#[must_use]
pub fn video_search(search: &VideoSearch) -> GraphqlRequest {
    GraphqlRequest {
        operation: "VideoList",
        query: VIDEO_SEARCH_QUERY,
        variables: json!({
            "input": {
                "display": search.display.as_str(),
                "filters": [
                    filter("audience_ids", AUDIENCE_IDS),
                    filter("search_query", &search.query),
                    filter("content_id", search.content.as_str()),
                ],
                "page": search.page,
            }
        }),
    }
}

/// The front page, `limit` albums per section.
#[must_use]
pub fn landing_page(limit: u32) -> GraphqlRequest {
    GraphqlRequest {
        operation: "getLandingPage",
        query: LANDING_PAGE_QUERY,
        variables: json!({ "limit": limit }),
    }
}

fn filter(name: &str, value: &str) -> Value {
    json!({ "name": name, "value": value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::options::{AlbumType, ContentType, SortOrder};

    fn filter_value<'a>(request: &'a GraphqlRequest, name: &str) -> Option<&'a str> {
        request.variables["input"]["filters"]
            .as_array()?
            .iter()
            .find(|f| f["name"] == name)
            .and_then(|f| f["value"].as_str())
    }

    #[test]
    fn test_album_info_sends_id_as_string() {
        let request = album_info(374_481);
        assert_eq!(request.variables, json!({ "id": "374481" }));
        assert!(request.query.contains("MutationError"));
    }

    #[test]
    fn test_album_pictures_carries_page_and_album_filter() {
        let request = album_pictures(12, 3);
        assert_eq!(request.variables["input"]["page"], 3);
        assert_eq!(request.variables["input"]["display"], "position");
        assert_eq!(filter_value(&request, "album_id"), Some("12"));
    }

    #[test]
    fn test_album_search_maps_every_option() {
        let search = AlbumSearch::new("tentacles")
            .page(2)
            .display(SortOrder::DateNewest)
            .album_type(AlbumType::Manga)
            .content(ContentType::Hentai);
        let request = album_search(&search);
        assert_eq!(request.variables["input"]["display"], "date_newest");
        assert_eq!(request.variables["input"]["page"], 2);
        assert_eq!(filter_value(&request, "album_type"), Some("Manga"));
        assert_eq!(filter_value(&request, "search_query"), Some("tentacles"));
        assert_eq!(filter_value(&request, "content_id"), Some("1"));
        assert_eq!(filter_value(&request, "restrict_genres"), Some("loose"));
        assert_eq!(filter_value(&request, "audience_ids"), Some(AUDIENCE_IDS));
    }

    #[test]
    fn test_video_search_has_no_album_filters() {
        let request = video_search(&VideoSearch::new("q"));
        assert_eq!(filter_value(&request, "album_type"), None);
        assert_eq!(filter_value(&request, "restrict_genres"), None);
        assert_eq!(filter_value(&request, "content_id"), Some("0"));
    }

    #[test]
    fn test_operation_name_is_not_serialized() {
        let body = serde_json::to_value(landing_page(15)).unwrap_or_default();
        assert_eq!(body["variables"]["limit"], 15);
        assert!(body.get("operation").is_none());
        assert!(body["query"].as_str().is_some_and(|q| q.contains("frontpage")));
    }
}
