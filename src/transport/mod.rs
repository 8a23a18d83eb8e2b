//! HTTP transport: a pooled client with retry/backoff, cookies and proxy support.
//!
//! # Features
//!
//! - Exponential backoff on `413, 429, 500, 502, 503, 504`, timeouts and
//!   connection errors (5 retries by default)
//! - Retry-After honored on retryable statuses
//! - Cookie jar so a login carries over to later requests
//! - Configurable User-Agent (fixed or random desktop Chrome)
//! - Bodies decoded as UTF-8 regardless of declared charset
//!
//! # Example
//!
//! ```no_run
//! use luscious_core::{ClientConfig, HttpClient};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&ClientConfig::default())?;
//! let body = client
//!     .post_json("https://example.com/graphql/", &json!({"query": "{ ping }"}))
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod retry;

pub use client::HttpClient;
pub use error::TransportError;
pub use retry::{FailureType, RetryDecision, RetryPolicy, parse_retry_after};
