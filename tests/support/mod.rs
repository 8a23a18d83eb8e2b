//! Shared helpers for integration tests: a session pointed at a mock server
//! and canned GraphQL responses.

#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use luscious_core::{ClientConfig, Endpoints, Luscious, RetryPolicy};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GRAPHQL_PATH: &str = "/graphql/nobatch/";

/// Client config aimed at `server` with fast, deterministic retries.
pub fn test_config(server: &MockServer, max_retries: u32) -> ClientConfig {
    ClientConfig::default()
        .endpoints(Endpoints::with_base(&server.uri()))
        .user_agent("luscious-test/1.0")
        .retry_policy(
            RetryPolicy::with_max_retries(max_retries)
                .backoff_factor(Duration::from_millis(10))
                .without_jitter(),
        )
}

/// Session aimed at `server` with no retries.
pub fn session(server: &MockServer) -> Luscious {
    Luscious::new(test_config(server, 0)).expect("client should build")
}

/// A detail payload for an album.
pub fn album_payload(id: u64, title: &str, is_manga: bool, pictures: u64) -> Value {
    json!({
        "id": id.to_string(),
        "title": title,
        "url": format!("/albums/some-title_{id}/"),
        "is_manga": is_manga,
        "number_of_pictures": pictures,
        "number_of_animated_pictures": 0,
        "content": {"id": "1", "title": "Hentai", "url": "/c/"},
        "cover": {"url": "https://cdn.example/cover.jpg"},
        "tags": [],
        "genres": [],
        "audiences": []
    })
}

/// A detail payload for a video with the given variant URLs.
pub fn video_payload(id: u64, title: &str, variants: [Option<String>; 4]) -> Value {
    let mut payload = json!({
        "id": id,
        "title": title,
        "url": format!("/videos/some-video_{id}/"),
        "poster_url": "https://cdn.example/poster.jpg",
        "tags": []
    });
    for (key, url) in ["v240p", "v360p", "v720p", "v1080p"].iter().zip(variants) {
        payload[*key] = url.map_or(Value::Null, Value::String);
    }
    payload
}

/// Wraps `node` as `{"data": {root: {field: node}}}`.
pub fn envelope(root: &str, field: &str, node: Value) -> Value {
    json!({ "data": { root: { field: node } } })
}

/// Mounts one page of an album picture listing.
pub async fn mount_picture_page(
    server: &MockServer,
    page: u32,
    total_pages: u32,
    urls: &[String],
    expected_calls: u64,
) {
    let items: Vec<Value> = urls
        .iter()
        .map(|u| json!({"url_to_original": u, "url": u}))
        .collect();
    mount_picture_items(server, page, total_pages, items, expected_calls).await;
}

/// Mounts one page of a picture listing with raw item objects.
pub async fn mount_picture_items(
    server: &MockServer,
    page: u32,
    total_pages: u32,
    items: Vec<Value>,
    expected_calls: u64,
) {
    let body = envelope(
        "picture",
        "list",
        json!({
            "info": {"page": page, "total_pages": total_pages, "total_items": 0},
            "items": items
        }),
    );
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("ListAlbumPictures"))
        .and(body_partial_json(json!({"variables": {"input": {"page": page}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mounts a media file served with `content_type`.
pub async fn mount_media(
    server: &MockServer,
    media_path: &str,
    content_type: &str,
    body: &[u8],
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_vec(), content_type),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Serves one HTTP response from a bare socket and returns its URL.
///
/// `head` is written verbatim (status line and headers, no blank line),
/// followed by each chunk of `chunks` with `gap` between them. The
/// connection is closed after the last chunk, whatever the headers claim.
pub async fn serve_raw_once(head: String, chunks: Vec<Vec<u8>>, gap: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local socket");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        if socket.write_all(format!("{head}\r\n\r\n").as_bytes()).await.is_err() {
            return;
        }
        for chunk in chunks {
            tokio::time::sleep(gap).await;
            if socket.write_all(&chunk).await.is_err() || socket.flush().await.is_err() {
                return;
            }
        }
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/media/video.mp4")
}
