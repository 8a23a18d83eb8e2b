//! File naming rules for downloaded items.
//!
//! A stem is the extension-less name an item is stored under; the
//! extension is only known once the response's Content-Type arrives.

use std::path::{Path, PathBuf};

use url::Url;

use crate::model::sanitize_name;

/// Suffix of the zero-byte marker left for an item that failed.
pub const SKIPPED_SUFFIX: &str = "_SKIPPED";

/// Guesses a file extension from a Content-Type header; unknown types get `.bin`.
pub(crate) fn extension_from_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/svg+xml" => ".svg",
        "image/avif" => ".avif",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/x-matroska" => ".mkv",
        "video/quicktime" => ".mov",
        "text/vtt" => ".vtt",
        "application/zip" => ".zip",
        _ => ".bin",
    }
}

/// Zero-padded manga page stem, e.g. `Title_007`.
///
/// The pad width is the digit count of `picture_count - 1`, at least 1.
pub(crate) fn manga_stem(sanitized_name: &str, index: usize, picture_count: u64) -> String {
    let width = picture_count.saturating_sub(1).to_string().len();
    format!("{sanitized_name}_{index:0width$}")
}

/// Stem taken from the last segment of a URL path, extension dropped.
///
/// Falls back to `item_<index>` when the URL has no usable file name.
pub(crate) fn stem_from_url(url: &str, index: usize) -> String {
    let segment = Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });
    let Some(segment) = segment.filter(|s| !s.is_empty()) else {
        return format!("item_{index}");
    };
    let decoded = match urlencoding::decode(&segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.clone(),
    };
    let stem = match decoded.rfind('.') {
        Some(0) | None => decoded.as_str(),
        Some(dot) => &decoded[..dot],
    };
    let stem = sanitize_name(stem);
    if stem == "_" {
        format!("item_{index}")
    } else {
        stem
    }
}

/// Whether `file_name` belongs to the item stored under `stem`.
///
/// Matches the stem itself, the stem plus any extension, and the skip marker.
pub(crate) fn matches_stem(file_name: &str, stem: &str) -> bool {
    match file_name.strip_prefix(stem) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') || rest.starts_with(SKIPPED_SUFFIX),
        None => false,
    }
}

/// Path of the skip marker for `stem`.
pub(crate) fn sentinel_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}{SKIPPED_SUFFIX}"))
}
