//! GraphQL API surface: endpoints, request documents, response decoding.
//!
//! This module is transport-agnostic apart from [`Api::call`], which posts
//! a [`GraphqlRequest`] through the shared [`HttpClient`] and unwraps the
//! envelope for one operation.

mod endpoints;
mod error;
mod options;
pub mod query;
mod response;

use serde_json::Value;
use tracing::debug;

pub use endpoints::{
    API_URL, AUDIENCE_IDS, DEFAULT_LANDING_LIMIT, Endpoints, HOME_URL, LOGIN_FAILURE_PHRASE,
    LOGIN_URL,
};
pub use error::{ApiError, MutationErrorEntry};
pub use options::{AlbumSearch, AlbumType, ContentType, ParseOptionError, SortOrder, VideoSearch};
pub use query::GraphqlRequest;
pub use response::{PageInfo, SearchPage, extract, split_listing};

pub(crate) use response::{lenient_string, lenient_u64, value_as_u64};

use crate::transport::HttpClient;

/// Client handle plus the URLs it talks to.
///
/// Entities keep a clone of this so they can issue follow-up calls (the
/// album picture listing) without borrowing the session.
#[derive(Debug, Clone)]
pub struct Api {
    client: HttpClient,
    endpoints: Endpoints,
}

impl Api {
    /// Wraps a client and its endpoints.
    #[must_use]
    pub fn new(client: HttpClient, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// The underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The configured site URLs.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Posts `request` and returns the node at `data.<path...>`.
    ///
    /// # Errors
    ///
    /// Transport failures, `MutationError` answers and missing nodes all map
    /// onto [`ApiError`].
    pub async fn call(&self, request: &GraphqlRequest, path: &[&str]) -> Result<Value, ApiError> {
        debug!(operation = request.operation, "posting GraphQL request");
        let body = self.client.post_json(&self.endpoints.api, request).await?;
        extract(body, request.operation, path)
    }

    /// Joins a site-relative path onto the home URL; absolute URLs pass through.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let home = self.endpoints.home.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{home}{path}")
        } else {
            format!("{home}/{path}")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn api() -> Api {
        let config = ClientConfig::default();
        Api::new(HttpClient::new(&config).unwrap(), Endpoints::with_base("http://host"))
    }

    #[test]
    fn test_absolute_url_joins_relative_paths() {
        let api = api();
        assert_eq!(api.absolute_url("/albums/x_1/"), "http://host/albums/x_1/");
        assert_eq!(api.absolute_url("albums/x_1/"), "http://host/albums/x_1/");
        assert_eq!(api.absolute_url("https://cdn/x.jpg"), "https://cdn/x.jpg");
    }
}
