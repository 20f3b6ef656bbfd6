// Error normalization for the secure-link API.
//
// Every transport/HTTP failure is normalized exactly once, at this
// boundary, into an [`ApiError`] with a stable [`ErrorKind`]. Consumers
// never re-interpret raw status codes downstream -- the single exception
// is the password-required / invalid-password split inside the link
// resolver, exposed here as [`PasswordChallenge`].

use reqwest::header::HeaderMap;
use serde::Deserialize;
use thiserror::Error;

/// Name of the response header carrying the server-side error id.
pub const ERROR_ID_HEADER: &str = "X-Error-Id";

/// Stable classification of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400 or 422 -- the request body or parameters were rejected.
    InvalidRequest,
    /// 401 -- a password is required or the supplied one was rejected.
    Unauthorized,
    /// 404 -- no such link.
    NotFound,
    /// 410 -- link expired, revoked, or max views reached.
    Gone,
    /// No HTTP response at all (DNS, connect, TLS, aborted transfer).
    NetworkUnreachable,
    /// 5xx.
    ServerError,
    /// Anything else.
    Unknown,
}

/// Finer-grained reading of a 401 body, used by the link resolver to
/// decide between "prompt for a password" and "wrong password, retry".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChallenge {
    /// The link is protected and no (valid) password header was sent.
    Required,
    /// A password was sent and the server rejected it.
    Invalid,
    /// The body gave no usable hint either way.
    Unclassified,
}

/// A normalized API error: stable kind, human-readable message, and the
/// correlation id the server attached (if any).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    /// Raw HTTP status; `0` when no response was received at all.
    pub status: u16,
    pub kind: ErrorKind,
    pub message: String,
    /// Server-side error id from `X-Error-Id` or the body's `errorId`.
    pub correlation_id: Option<String>,
}

/// Structured fields we look for in an error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "errorId")]
    error_id: Option<String>,
}

impl ApiError {
    /// Normalize a raw response into an [`ApiError`].
    ///
    /// Pure and deterministic: identical inputs always produce the same
    /// error. `status == 0` means no transport-level response existed.
    pub fn normalize(status: u16, body: &[u8], headers: &HeaderMap) -> Self {
        let kind = kind_for_status(status);
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| default_message(status, kind, body));

        let correlation_id = headers
            .get(ERROR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| parsed.and_then(|b| b.error_id));

        Self {
            status,
            kind,
            message,
            correlation_id,
        }
    }

    /// Classify a 401 as a password challenge by inspecting the message
    /// and raw body text (case-insensitive substring match).
    pub fn password_challenge(&self) -> PasswordChallenge {
        if self.kind != ErrorKind::Unauthorized {
            return PasswordChallenge::Unclassified;
        }
        classify_password_text(&self.message)
    }

    /// Render the message with the correlation id appended, matching how
    /// operators expect to quote errors back at the server logs.
    pub fn message_with_correlation(&self) -> String {
        match &self.correlation_id {
            Some(id) => format!("{} (errorId: {id})", self.message),
            None => self.message.clone(),
        }
    }
}

fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        0 => ErrorKind::NetworkUnreachable,
        400 | 422 => ErrorKind::InvalidRequest,
        401 => ErrorKind::Unauthorized,
        404 => ErrorKind::NotFound,
        410 => ErrorKind::Gone,
        500.. => ErrorKind::ServerError,
        _ => ErrorKind::Unknown,
    }
}

/// Per-kind fallback message when the body carries no structured `message`.
///
/// For 401 the raw body text still decides the wording, so that the
/// required-vs-invalid distinction survives servers that answer in
/// plain text instead of JSON.
fn default_message(status: u16, kind: ErrorKind, body: &[u8]) -> String {
    match kind {
        ErrorKind::NetworkUnreachable => "Network error while contacting API.".into(),
        ErrorKind::InvalidRequest => "Invalid request. Please review the submitted fields.".into(),
        ErrorKind::Unauthorized => {
            let text = String::from_utf8_lossy(body);
            match classify_password_text(&text) {
                PasswordChallenge::Required => "Password required for this link.".into(),
                PasswordChallenge::Invalid => "Invalid password.".into(),
                PasswordChallenge::Unclassified => {
                    "Authentication required or invalid password.".into()
                }
            }
        }
        ErrorKind::NotFound => "Resource not found.".into(),
        ErrorKind::Gone => "Link expired, revoked, or max views reached.".into(),
        ErrorKind::ServerError => {
            "Unexpected server error. Please try again in a few moments.".into()
        }
        ErrorKind::Unknown => format!("Request failed (HTTP {status})."),
    }
}

fn classify_password_text(text: &str) -> PasswordChallenge {
    let lower = text.to_lowercase();
    if lower.contains("invalid password") {
        PasswordChallenge::Invalid
    } else if lower.contains("password required") {
        PasswordChallenge::Required
    } else {
        PasswordChallenge::Unclassified
    }
}

impl From<reqwest::Error> for ApiError {
    /// Transport errors that never produced a response map to
    /// `NetworkUnreachable` with status 0.
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map_or(0, |s| s.as_u16());
        if status == 0 {
            Self {
                status: 0,
                kind: ErrorKind::NetworkUnreachable,
                message: "Network error while contacting API.".into(),
                correlation_id: None,
            }
        } else {
            Self::normalize(status, &[], &HeaderMap::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;

    use super::*;

    fn normalize(status: u16, body: &str) -> ApiError {
        ApiError::normalize(status, body.as_bytes(), &HeaderMap::new())
    }

    #[test]
    fn status_kind_table() {
        let cases = [
            (0, ErrorKind::NetworkUnreachable),
            (400, ErrorKind::InvalidRequest),
            (401, ErrorKind::Unauthorized),
            (404, ErrorKind::NotFound),
            (410, ErrorKind::Gone),
            (422, ErrorKind::InvalidRequest),
            (500, ErrorKind::ServerError),
            (503, ErrorKind::ServerError),
            (418, ErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            assert_eq!(normalize(status, "").kind, kind, "status {status}");
        }
    }

    #[test]
    fn normalization_is_deterministic() {
        let a = normalize(410, r#"{"message":"gone"}"#);
        let b = normalize(410, r#"{"message":"gone"}"#);
        assert_eq!(a, b);
    }

    #[test]
    fn body_message_preferred_over_default() {
        let err = normalize(400, r#"{"message":"targetUrl must be absolute"}"#);
        assert_eq!(err.message, "targetUrl must be absolute");
    }

    #[test]
    fn network_unreachable_message() {
        let err = normalize(0, "");
        assert_eq!(err.message, "Network error while contacting API.");
    }

    #[test]
    fn gone_default_message() {
        let err = normalize(410, "not json");
        assert_eq!(err.message, "Link expired, revoked, or max views reached.");
    }

    #[test]
    fn password_required_vs_invalid() {
        let required = normalize(401, r#"{"message":"Password required"}"#);
        assert_eq!(required.password_challenge(), PasswordChallenge::Required);

        let invalid = normalize(401, "INVALID PASSWORD");
        assert_eq!(invalid.password_challenge(), PasswordChallenge::Invalid);

        let other = normalize(401, "nope");
        assert_eq!(other.password_challenge(), PasswordChallenge::Unclassified);
    }

    #[test]
    fn correlation_id_header_wins_over_body() {
        let mut headers = HeaderMap::new();
        headers.insert(ERROR_ID_HEADER, HeaderValue::from_static("hdr-1"));
        let err = ApiError::normalize(500, br#"{"errorId":"body-1"}"#, &headers);
        assert_eq!(err.correlation_id.as_deref(), Some("hdr-1"));

        let err = ApiError::normalize(500, br#"{"errorId":"body-1"}"#, &HeaderMap::new());
        assert_eq!(err.correlation_id.as_deref(), Some("body-1"));

        let err = normalize(500, "{}");
        assert_eq!(err.correlation_id, None);
    }

    #[test]
    fn message_with_correlation_suffix() {
        let mut err = normalize(500, r#"{"message":"boom"}"#);
        assert_eq!(err.message_with_correlation(), "boom");
        err.correlation_id = Some("abc".into());
        assert_eq!(err.message_with_correlation(), "boom (errorId: abc)");
    }
}
