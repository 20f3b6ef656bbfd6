// Shared transport configuration for building reqwest::Client instances.
//
// Redirect behavior matters here: the link-resolution protocol must see
// a 3xx answer itself to classify it, so resolution uses a client with
// redirects disabled while API calls keep reqwest's default policy.

use std::time::Duration;

use crate::error::{ApiError, ErrorKind};

const USER_AGENT: &str = concat!("linkseal/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate (for self-hosted instances with
    /// self-signed certs).
    DangerAcceptInvalid,
}

/// Transport settings shared by every request the client makes.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        Self::finish(self.builder())
    }

    /// Build the client used for link resolution: identical transport
    /// settings, but automatic redirect following disabled, so a 3xx
    /// answer surfaces with its `Location` intact instead of being
    /// swallowed by the transport.
    pub fn build_resolver(&self) -> Result<reqwest::Client, ApiError> {
        Self::finish(self.builder().redirect(reqwest::redirect::Policy::none()))
    }

    fn builder(&self) -> reqwest::ClientBuilder {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if matches!(self.tls, TlsMode::DangerAcceptInvalid) {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder
    }

    fn finish(builder: reqwest::ClientBuilder) -> Result<reqwest::Client, ApiError> {
        builder.build().map_err(|e| ApiError {
            status: 0,
            kind: ErrorKind::NetworkUnreachable,
            message: format!("failed to build HTTP client: {e}"),
            correlation_id: None,
        })
    }
}
