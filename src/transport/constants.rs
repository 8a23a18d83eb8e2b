//! Constants for the transport module (timeouts, retry budget, backoff).

use std::time::Duration;

/// Default HTTP connect timeout (5 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default HTTP read timeout (5 seconds).
pub const READ_TIMEOUT_SECS: u64 = 5;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default backoff factor; the first retry waits this long, later ones double it.
pub const DEFAULT_BACKOFF_FACTOR: Duration = Duration::from_secs(1);

/// Upper bound for a single backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Status codes that are retried instead of surfaced immediately.
pub const DEFAULT_RETRY_STATUSES: &[u16] = &[413, 429, 500, 502, 503, 504];

/// Maximum Retry-After header value (1 hour) to prevent excessive delays.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);
