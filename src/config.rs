//! Client configuration shared by the API session and the download engine.

use std::time::Duration;

use crate::api::Endpoints;
use crate::transport::RetryPolicy;
use crate::transport::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::user_agent::UserAgent;

/// Settings used to build an [`HttpClient`](crate::transport::HttpClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use luscious_core::{ClientConfig, RetryPolicy};
///
/// let config = ClientConfig::default()
///     .timeouts(Duration::from_secs(10), Duration::from_secs(30))
///     .retry_policy(RetryPolicy::with_max_retries(2))
///     .user_agent("my-agent/1.0");
/// assert_eq!(config.retry.max_retries(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Idle limit for each socket read; a slow body that keeps arriving is
    /// not cut off.
    pub read_timeout: Duration,
    /// Retry budget, backoff and retryable statuses.
    pub retry: RetryPolicy,
    /// User-Agent selection.
    pub user_agent: UserAgent,
    /// Site URLs.
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            user_agent: UserAgent::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    /// Sets connect and read timeouts.
    #[must_use]
    pub fn timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pins or randomizes the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<UserAgent>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replaces the site endpoints.
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_five_second_timeouts() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries(), 5);
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn test_builder_methods_override_fields() {
        let config = ClientConfig::default()
            .timeouts(Duration::from_secs(1), Duration::from_secs(2))
            .user_agent("agent")
            .endpoints(Endpoints::with_base("http://localhost:1"));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, UserAgent::Fixed("agent".to_string()));
        assert_eq!(config.endpoints.home, "http://localhost:1");
    }
}
