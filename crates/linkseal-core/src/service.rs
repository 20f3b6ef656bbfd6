// ── LinkService facade ──
//
// The consumer-facing entry point: wraps the API client with short-code
// parsing, notification fan-out for mutating operations, and a factory
// for the statistics aggregator. Link resolution deliberately bypasses
// the notification sink -- its outcomes (password prompts, blocked
// redirects) are control flow the caller handles, not toast material.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;
use url::Url;

use linkseal_api::types::{CreateLinkRequest, LinkCreated, LinkOptions};
use linkseal_api::{
    ApiError, ErrorKind, OpenOutcome, SecureLinkClient, ShortCode, TransportConfig,
    transport::TlsMode,
};

use crate::aggregator::StatsAggregator;
use crate::config::ServiceConfig;
use crate::error::CoreError;
use crate::notify::{NoticeKind, NotificationSink, TracingSink};

/// Result of revoking a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    /// The server answered 404: nothing left to revoke.
    AlreadyAbsent,
}

pub struct LinkService {
    client: SecureLinkClient,
    config: ServiceConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl LinkService {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: if config.accept_invalid_certs {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            },
            timeout: config.timeout,
        };
        let client = SecureLinkClient::new(config.base_url.clone(), &transport)
            .map_err(|e| CoreError::Config { message: e.message })?;

        Ok(Self {
            client,
            config,
            notifier: Arc::new(TracingSink),
        })
    }

    /// Replace the default tracing-backed notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn client(&self) -> &SecureLinkClient {
        &self.client
    }

    /// Parse user input into a [`ShortCode`].
    pub fn parse_short_code(&self, input: &str) -> Result<ShortCode, CoreError> {
        input
            .parse()
            .map_err(|_| CoreError::InvalidShortCode { input: input.into() })
    }

    /// Absolute public URL for a short code.
    pub fn public_access_url(&self, code: &ShortCode) -> Url {
        self.client.public_access_url(code)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Resolve a secure link. Errors pass through verbatim; see the
    /// module comment for why no notification is emitted here.
    pub async fn open_link(
        &self,
        code: &ShortCode,
        password: Option<&SecretString>,
    ) -> Result<OpenOutcome, CoreError> {
        let outcome = self.client.open_link(code, password).await?;
        info!(code = %code, outcome = outcome.variant(), "link resolved");
        Ok(outcome)
    }

    pub async fn create_link(
        &self,
        target_url: &str,
        options: LinkOptions,
    ) -> Result<LinkCreated, CoreError> {
        let request = CreateLinkRequest::new(target_url, options);
        let created = self
            .client
            .create_link(&request)
            .await
            .inspect_err(|e| self.notify_error(e))?;
        info!(short_code = %created.short_code, "link created");
        Ok(created)
    }

    pub async fn upload_link(
        &self,
        filename: &str,
        contents: Vec<u8>,
        options: &LinkOptions,
    ) -> Result<LinkCreated, CoreError> {
        let created = self
            .client
            .upload_link(filename, contents, options)
            .await
            .inspect_err(|e| self.notify_error(e))?;
        info!(short_code = %created.short_code, filename, "upload link created");
        Ok(created)
    }

    pub async fn revoke_link(&self, code: &ShortCode) -> Result<RevokeOutcome, CoreError> {
        match self.client.revoke_link(code).await {
            Ok(()) => {
                info!(code = %code, "link revoked");
                Ok(RevokeOutcome::Revoked)
            }
            Err(err) if err.kind == ErrorKind::NotFound => Ok(RevokeOutcome::AlreadyAbsent),
            Err(err) => {
                self.notify_error(&err);
                Err(err.into())
            }
        }
    }

    /// Build a statistics aggregator sharing this service's client.
    pub fn stats_aggregator(&self) -> StatsAggregator {
        StatsAggregator::new(self.client.clone(), self.config.top_limit)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn notify_error(&self, err: &ApiError) {
        self.notifier.notify(
            NoticeKind::Error,
            &format!("HTTP {}", err.status),
            &err.message_with_correlation(),
        );
    }
}
