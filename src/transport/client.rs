//! HTTP client wrapper with retry, cookie persistence and proxy fallback.
//!
//! [`HttpClient`] is created once per session and reused for every GraphQL
//! call and media download, taking advantage of connection pooling. Every
//! request goes through the same retry loop driven by the configured
//! [`RetryPolicy`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::TransportError;
use super::retry::{FailureType, RetryDecision, RetryPolicy, parse_retry_after};
use crate::config::ClientConfig;

/// HTTP client shared by the API session and the download engine.
///
/// Cloning is cheap: clones share the connection pool and cookie jar.
///
/// # Concurrency
///
/// The library drives one request at a time. Issuing requests from several
/// tasks against the same client is not part of its contract; callers doing
/// so must coordinate externally (login state and retry pacing are shared).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Builds a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if reqwest rejects the
    /// configuration (e.g. TLS backend initialization failure).
    #[instrument(level = "debug", skip(config))]
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let user_agent = config.user_agent.resolve();
        debug!(user_agent = %user_agent, "building HTTP client");
        let jar = Arc::new(Jar::default());
        let client = build_client(config, &user_agent, jar)
            .map_err(|source| TransportError::ClientBuild { source })?;
        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// Returns the retry policy applied to every request.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// POSTs a JSON document and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure, a non-retryable or
    /// exhausted error status, or a body that is not valid JSON.
    #[instrument(level = "debug", skip(self, body), fields(url = %url))]
    pub async fn post_json<T>(&self, url: &str, body: &T) -> Result<Value, TransportError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .send_with_retry(url, |client| client.post(url).json(body))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::decode(url, e))
    }

    /// POSTs a url-encoded form and returns the body decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure or an error status.
    #[instrument(level = "debug", skip(self, fields), fields(url = %url))]
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let body = encode_form(fields);
        let response = self
            .send_with_retry(url, |client| {
                client
                    .post(url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body.clone())
            })
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(url, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Issues a GET and returns the successful response with its body unread.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure or an error status.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response, TransportError> {
        if reqwest::Url::parse(url).is_err() {
            return Err(TransportError::invalid_url(url));
        }
        self.send_with_retry(url, |client| client.get(url)).await
    }

    /// Sends a request, retrying transient failures according to the policy.
    ///
    /// Retry-After on a retryable status replaces the computed backoff.
    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response, TransportError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "sending request");

            let error = match self.send_once(url, &build).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            let failure_type = self.retry.classify(&error);
            let retry_after = if failure_type == FailureType::Permanent {
                None
            } else {
                retry_after_delay(&error)
            };

            match self.retry.should_retry(failure_type, attempt) {
                RetryDecision::Retry {
                    delay: backoff_delay,
                    attempt: next_attempt,
                } => {
                    let delay = retry_after.unwrap_or(backoff_delay);
                    info!(
                        url = %url,
                        attempt = next_attempt,
                        max_attempts = self.retry.max_attempts(),
                        delay_ms = delay.as_millis(),
                        using_retry_after = retry_after.is_some(),
                        error = %error,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(url = %url, %reason, "not retrying request");
                    return Err(error);
                }
            }
        }
    }

    async fn send_once<F>(&self, url: &str, build: &F) -> Result<Response, TransportError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = build(&self.client).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url)
            } else {
                TransportError::network(url, e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);
        Err(TransportError::http_status_with_retry_after(
            url,
            status.as_u16(),
            retry_after,
        ))
    }
}

fn retry_after_delay(error: &TransportError) -> Option<std::time::Duration> {
    match error {
        TransportError::HttpStatus {
            retry_after: Some(value),
            ..
        } => parse_retry_after(value),
        _ => None,
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn build_client(
    config: &ClientConfig,
    user_agent: &str,
    jar: Arc<Jar>,
) -> Result<Client, reqwest::Error> {
    match try_build_client(config, user_agent, Arc::clone(&jar), false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Build(error)) => Err(error),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic while reading system proxy settings.
            warn!("HTTP client builder panicked loading system proxies; using env-proxy fallback");
            match try_build_client(config, user_agent, jar, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Build(error)) => Err(error),
                Err(BuildClientFailure::Panic) => {
                    // Without system proxy lookup the builder has nothing left to panic on;
                    // fall back to the plainest possible client.
                    base_client_builder(config, user_agent, None).no_proxy().build()
                }
            }
        }
    }
}

fn try_build_client(
    config: &ClientConfig,
    user_agent: &str,
    jar: Arc<Jar>,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_client_builder(config, user_agent, Some(jar));
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_client_builder(
    config: &ClientConfig,
    user_agent: &str,
    jar: Option<Arc<Jar>>,
) -> ClientBuilder {
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .gzip(true)
        .user_agent(user_agent);
    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }
    builder
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_escapes_reserved_characters() {
        let body = encode_form(&[("login", "a b@c.d"), ("password", "p&ss=1"), ("remember", "on")]);
        assert_eq!(body, "login=a%20b%40c.d&password=p%26ss%3D1&remember=on");
    }

    #[test]
    fn test_retry_after_delay_only_for_status_errors() {
        let error = TransportError::http_status_with_retry_after(
            "http://example.com",
            429,
            Some("7".to_string()),
        );
        assert_eq!(
            retry_after_delay(&error),
            Some(std::time::Duration::from_secs(7))
        );
        assert_eq!(retry_after_delay(&TransportError::timeout("x")), None);
    }

    #[test]
    fn test_new_client_carries_retry_policy() {
        let config = ClientConfig::default().retry_policy(RetryPolicy::with_max_retries(1));
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.retry_policy().max_retries(), 1);
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_url() {
        let client = HttpClient::new(&ClientConfig::default()).unwrap();
        let result = client.get("not a url").await;
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }
}
