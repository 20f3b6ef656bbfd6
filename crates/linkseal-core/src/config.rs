// Runtime configuration for the service facade and aggregator.

use std::time::Duration;

use url::Url;

/// Default cadence of the statistics poller.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Default `limit` for top-links and security-exception queries.
pub const DEFAULT_TOP_LIMIT: u32 = 5;

/// Configuration for a [`LinkService`](crate::LinkService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the secure-link service.
    pub base_url: Url,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Accept self-signed TLS certificates.
    pub accept_invalid_certs: bool,

    /// Interval between automatic statistics refreshes.
    pub poll_interval: Duration,

    /// `limit` passed to the top-links and security-exception queries.
    pub top_limit: u32,
}

impl ServiceConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}
