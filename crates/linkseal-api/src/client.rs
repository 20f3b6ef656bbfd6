// Hand-crafted async HTTP client for the secure-link service.
//
// Every outbound request carries a generated X-Correlation-Id so a
// failing call can be matched against server logs. Link resolution
// (`open_link`) reads the response as raw bytes with headers -- the
// outcome depends on headers, never on an auto-decoded body.

use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, ErrorKind, PasswordChallenge};
use crate::resolve::{OpenOutcome, ShortCode, classify_success};
use crate::transport::TransportConfig;
use crate::types::{
    AccessSummary, CreateLinkRequest, DailyAccess, FailureCount, HourlyAccess, LinkCounts,
    LinkCreated, LinkOptions, SecurityException, TopLink,
};

/// Header carrying the per-request correlation id.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Header carrying the link password. Never sent as a query parameter --
/// query strings leak into access logs and browser history.
pub const LINK_PASSWORD_HEADER: &str = "X-Link-Password";

/// Async client for the secure-link service.
///
/// Cheap to clone: the underlying `reqwest::Client`s are `Arc` handles.
/// Link resolution goes through a separate client with redirect
/// following disabled, so a 3xx answer is classified here instead of
/// being transparently followed by the transport.
#[derive(Clone, Debug)]
pub struct SecureLinkClient {
    http: reqwest::Client,
    resolver: reqwest::Client,
    base_url: Url,
}

impl SecureLinkClient {
    // ── Constructor ──────────────────────────────────────────────────

    /// Build a client from a base URL and transport config.
    ///
    /// Rejects base URLs that cannot serve as a base for relative
    /// paths (e.g. `mailto:`), so later joins can never fail.
    pub fn new(mut base_url: Url, transport: &TransportConfig) -> Result<Self, ApiError> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError {
                status: 0,
                kind: ErrorKind::InvalidRequest,
                message: format!("base URL '{base_url}' cannot serve as a base for API paths"),
                correlation_id: None,
            });
        }

        // Uniform trailing slash so relative joins behave.
        let path = base_url.path().trim_end_matches('/').to_owned();
        base_url.set_path(&format!("{path}/"));

        Ok(Self {
            http: transport.build_client()?,
            resolver: transport.build_resolver()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute public URL for a short code (`{base}/l/{code}`).
    pub fn public_access_url(&self, code: &ShortCode) -> Url {
        self.url(&format!("l/{code}"))
    }

    // ── URL / request plumbing ───────────────────────────────────────

    fn url(&self, path: &str) -> Url {
        // base_url ends with `/` and is validated joinable at
        // construction, so relative joins cannot fail.
        self.base_url
            .join(path)
            .expect("base URL validated at construction")
    }

    fn new_correlation_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(CORRELATION_ID_HEADER, Self::new_correlation_id())
    }

    // ── Link lifecycle ───────────────────────────────────────────────

    /// `POST /api/links` -- create a shareable link for a target URL.
    pub async fn create_link(&self, request: &CreateLinkRequest) -> Result<LinkCreated, ApiError> {
        let url = self.url("api/links");
        debug!(%url, "POST create link");

        let resp = self
            .http
            .post(url)
            .header(CORRELATION_ID_HEADER, Self::new_correlation_id())
            .json(request)
            .send()
            .await?;
        Self::handle_json(resp).await
    }

    /// `POST /api/links/upload` -- create a link serving an uploaded file.
    pub async fn upload_link(
        &self,
        filename: &str,
        contents: Vec<u8>,
        options: &LinkOptions,
    ) -> Result<LinkCreated, ApiError> {
        let url = self.url("api/links/upload");
        debug!(%url, filename, "POST upload link");

        let mut form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(contents).file_name(filename.to_owned()),
        );
        if let Some(expires_at) = options.expires_at {
            form = form.text("expiresAt", expires_at.to_rfc3339());
        }
        if let Some(max_views) = options.max_views {
            form = form.text("maxViews", max_views.to_string());
        }
        if let Some(ref password) = options.password {
            form = form.text("password", password.clone());
        }

        let resp = self
            .http
            .post(url)
            .header(CORRELATION_ID_HEADER, Self::new_correlation_id())
            .multipart(form)
            .send()
            .await?;
        Self::handle_json(resp).await
    }

    /// `DELETE /l/{code}` -- revoke a link. Void on success; a 404 means
    /// the link was already absent and surfaces as `NotFound` for the
    /// caller to treat as it sees fit.
    pub async fn revoke_link(&self, code: &ShortCode) -> Result<(), ApiError> {
        let url = self.url(&format!("l/{code}"));
        debug!(%url, "DELETE revoke link");

        let resp = self
            .http
            .delete(url)
            .header(CORRELATION_ID_HEADER, Self::new_correlation_id())
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(resp).await)
        }
    }

    // ── Link resolution protocol ─────────────────────────────────────

    /// `GET /l/{code}` -- resolve a secure link into a typed outcome.
    ///
    /// Stateless between invocations: a `PasswordRequired` outcome means
    /// the caller must call again with a password. No password is ever
    /// cached here. Sent through the no-redirect client, so a 3xx answer
    /// is classified explicitly; see [`classify_success`](crate::resolve)
    /// for the 2xx disambiguation rules.
    pub async fn open_link(
        &self,
        code: &ShortCode,
        password: Option<&SecretString>,
    ) -> Result<OpenOutcome, ApiError> {
        let request_url = self.url(&format!("l/{code}"));
        debug!(url = %request_url, with_password = password.is_some(), "GET open link");

        let mut builder = self
            .resolver
            .get(request_url.clone())
            .header(CORRELATION_ID_HEADER, Self::new_correlation_id());
        if let Some(password) = password {
            builder = builder.header(LINK_PASSWORD_HEADER, password.expose_secret());
        }

        // The resolver never follows redirects, so a transport failure
        // here is a genuine failure to reach the API itself.
        let resp = builder.send().await?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let final_url = resp.url().clone();

        if status.is_redirection() {
            let target = headers
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|location| self.base_url.join(location).ok());
            let Some(target_url) = target else {
                return Ok(OpenOutcome::Blocked {
                    reason: "redirect without usable Location".into(),
                    resolved_url: None,
                });
            };
            return Ok(self.follow_redirect(target_url).await);
        }

        let body = resp.bytes().await?;

        if status.is_success() {
            return Ok(classify_success(
                &self.base_url,
                &request_url,
                &final_url,
                &headers,
                body,
            ));
        }

        let err = ApiError::normalize(status.as_u16(), &body, &headers);
        if err.kind == ErrorKind::Unauthorized {
            // Expected control flow, not an error escalation: the caller
            // prompts for a password and re-invokes.
            let attempted = match err.password_challenge() {
                PasswordChallenge::Required => false,
                PasswordChallenge::Invalid => true,
                PasswordChallenge::Unclassified => password.is_some(),
            };
            return Ok(OpenOutcome::PasswordRequired {
                attempted_with_password: attempted,
            });
        }

        Err(err)
    }

    /// Probe a redirect destination the way a transparent client would
    /// have followed it. The API already answered at this point, so a
    /// destination that refuses the hop is `Blocked`, not a network
    /// failure of our own service.
    async fn follow_redirect(&self, target_url: Url) -> OpenOutcome {
        match self.http.get(target_url.clone()).send().await {
            Ok(_) => OpenOutcome::Redirected { target_url },
            Err(err) => {
                debug!(url = %target_url, error = %err, "redirect destination refused the hop");
                OpenOutcome::Blocked {
                    reason: "destination blocked automatic redirect".into(),
                    resolved_url: Some(target_url),
                }
            }
        }
    }

    // ── Statistics endpoints ─────────────────────────────────────────

    /// `GET /api/stats/links`.
    pub async fn link_counts(&self) -> Result<LinkCounts, ApiError> {
        self.get_json("api/stats/links").await
    }

    /// `GET /api/stats/access/summary`.
    pub async fn access_summary(&self) -> Result<AccessSummary, ApiError> {
        self.get_json("api/stats/access/summary").await
    }

    /// `GET /api/stats/access/hourly`.
    pub async fn access_hourly(&self) -> Result<Vec<HourlyAccess>, ApiError> {
        self.get_list_lenient("api/stats/access/hourly", &[]).await
    }

    /// `GET /api/stats/access/daily`.
    pub async fn access_daily(&self) -> Result<Vec<DailyAccess>, ApiError> {
        self.get_list_lenient("api/stats/access/daily", &[]).await
    }

    /// `GET /api/stats/access/failures`.
    pub async fn access_failures(&self) -> Result<Vec<FailureCount>, ApiError> {
        self.get_list_lenient("api/stats/access/failures", &[]).await
    }

    /// `GET /api/stats/links/top?limit=N`.
    pub async fn top_links(&self, limit: u32) -> Result<Vec<TopLink>, ApiError> {
        self.get_list_lenient("api/stats/links/top", &[("limit", limit.to_string())])
            .await
    }

    /// `GET /api/stats/security/exceptions?limit=N`.
    pub async fn security_exceptions(&self, limit: u32) -> Result<Vec<SecurityException>, ApiError> {
        self.get_list_lenient(
            "api/stats/security/exceptions",
            &[("limit", limit.to_string())],
        )
        .await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let resp = self.get(url).send().await?;
        Self::handle_json(resp).await
    }

    /// Fetch a JSON list, dropping entries that fail shape validation.
    ///
    /// A stats endpoint answering with a partially-malformed list must
    /// not poison the whole payload; bad entries are logged and skipped.
    async fn get_list_lenient<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let url = self.url(path);
        debug!(%url, ?params, "GET");

        let resp = self.get(url).query(params).send().await?;
        let values: Vec<serde_json::Value> = Self::handle_json(resp).await?;

        let total = values.len();
        let entries: Vec<T> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if entries.len() < total {
            warn!(
                path,
                dropped = total - entries.len(),
                "dropped malformed stat entries"
            );
        }
        Ok(entries)
    }

    async fn handle_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::error_from_response(resp).await);
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError {
            status: status.as_u16(),
            kind: ErrorKind::Unknown,
            message: format!("malformed response body: {e}"),
            correlation_id: None,
        })
    }

    async fn error_from_response(resp: reqwest::Response) -> ApiError {
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.unwrap_or_default();
        ApiError::normalize(status, &body, &headers)
    }
}
