//! Album picture listing walker.
//!
//! Page 1 is requested first and its `total_pages` bounds the walk; pages
//! `2..=total_pages` follow one at a time so the concatenated result keeps
//! album order.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::{Api, ApiError, SearchPage, query, split_listing};

const OPERATION: &str = "ListAlbumPictures";

/// Fetches one page of an album's picture listing.
///
/// # Errors
///
/// Returns [`ApiError`] if the request fails or the listing is malformed.
pub async fn picture_page(api: &Api, album_id: u64, page: u32) -> Result<SearchPage<Value>, ApiError> {
    let node = api
        .call(&query::album_pictures(album_id, page), &["picture", "list"])
        .await?;
    split_listing(node, OPERATION)
}

/// Collects every original-resolution picture URL of an album, in order.
///
/// The result has one slot per listing item, so its length is the sum of
/// the per-page item counts. Items without `url_to_original` keep their
/// slot as `None`. Later pages that report a different `total_pages` are
/// logged and otherwise ignored.
///
/// # Errors
///
/// Returns [`ApiError`] if any page fails; partial results are discarded.
#[instrument(level = "debug", skip(api))]
pub async fn album_content_urls(
    api: &Api,
    album_id: u64,
) -> Result<Vec<Option<String>>, ApiError> {
    let first = picture_page(api, album_id, 1).await?;
    let total_pages = first.info.total_pages;
    debug!(total_pages, "walking picture listing");

    let mut urls = Vec::new();
    collect_urls(&mut urls, first.items, album_id, 1);

    for page in 2..=total_pages {
        let page = u32::try_from(page)
            .map_err(|_| ApiError::malformed(OPERATION, format!("page {page} out of range")))?;
        let next = picture_page(api, album_id, page).await?;
        if next.info.total_pages != total_pages {
            warn!(
                album_id,
                page,
                first_total = total_pages,
                reported_total = next.info.total_pages,
                "page count changed during walk; keeping the first page's count"
            );
        }
        collect_urls(&mut urls, next.items, album_id, page);
    }

    debug!(count = urls.len(), "picture listing complete");
    Ok(urls)
}

fn collect_urls(urls: &mut Vec<Option<String>>, items: Vec<Value>, album_id: u64, page: u32) {
    for (position, item) in items.into_iter().enumerate() {
        let url = item
            .get("url_to_original")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        if url.is_none() {
            warn!(album_id, page, position, "picture has no original URL");
        }
        urls.push(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_urls_keeps_a_slot_per_item() {
        let mut urls = vec![Some("first".to_string())];
        let items = vec![
            json!({"url_to_original": "a"}),
            json!({"url_to_original": null}),
            json!({"url_to_original": ""}),
            json!({"url": "thumb"}),
            json!({"url_to_original": "b"}),
        ];
        collect_urls(&mut urls, items, 1, 2);
        assert_eq!(
            urls,
            vec![
                Some("first".to_string()),
                Some("a".to_string()),
                None,
                None,
                None,
                Some("b".to_string()),
            ]
        );
    }
}
