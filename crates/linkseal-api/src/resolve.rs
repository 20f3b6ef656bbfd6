// Link-resolution protocol types and response disambiguation.
//
// A 2xx answer from `GET /l/{code}` means different things depending on
// headers alone: a redirect target, a file to save, or nothing usable.
// The rules live in [`classify_success`], in strict priority order, so
// that ambiguous inputs always land in `Blocked` instead of a guessed
// outcome. The driving request loop is in `SecureLinkClient::open_link`.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, LOCATION};
use thiserror::Error;
use url::Url;

/// Filename used when `Content-Disposition` marks an attachment but no
/// usable filename parameter can be parsed out of it.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "secure-link-download";

// ── ShortCode ────────────────────────────────────────────────────────

/// Opaque short code addressing a secure link.
///
/// Parses either a raw token (`[A-Za-z0-9_-]{4,}`) or a full URL / path
/// containing an `/l/{code}` segment. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a short code or /l/{{code}} URL: {input:?}")]
pub struct ParseShortCodeError {
    pub input: String,
}

impl ShortCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_code_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '-'
    }
}

impl FromStr for ShortCode {
    type Err = ParseShortCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseShortCodeError { input: s.into() };

        if trimmed.is_empty() {
            return Err(err());
        }

        // Full URL or path form: take the token after the last "/l/".
        if trimmed.contains('/') {
            let code = trimmed
                .rfind("/l/")
                .map(|idx| &trimmed[idx + 3..])
                .map(|rest| {
                    let end = rest
                        .find(|c| !Self::is_code_char(c))
                        .unwrap_or(rest.len());
                    &rest[..end]
                })
                .filter(|code| !code.is_empty())
                .ok_or_else(err)?;
            return Ok(Self(code.to_owned()));
        }

        // Raw token form requires at least 4 code characters.
        if trimmed.len() >= 4 && trimmed.chars().all(Self::is_code_char) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(err())
        }
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── OpenOutcome ──────────────────────────────────────────────────────

/// The typed result of opening a secure link.
#[derive(Debug, Clone)]
pub enum OpenOutcome {
    /// The link resolves to a URL the caller should navigate to.
    Redirected { target_url: Url },
    /// The link resolves to binary content to save locally.
    FileDownload { bytes: Bytes, filename: String },
    /// The server demands or rejected a password. `attempted_with_password`
    /// distinguishes the first challenge from a rejected retry; the caller
    /// re-invokes with a password to continue.
    PasswordRequired { attempted_with_password: bool },
    /// Resolution succeeded server-side but the client cannot complete it
    /// (cross-origin redirect policy, or an undecidable 2xx response).
    Blocked {
        reason: String,
        resolved_url: Option<Url>,
    },
}

impl OpenOutcome {
    /// Stable variant name, for logging and idempotence checks.
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Redirected { .. } => "redirected",
            Self::FileDownload { .. } => "file-download",
            Self::PasswordRequired { .. } => "password-required",
            Self::Blocked { .. } => "blocked",
        }
    }
}

// ── 2xx disambiguation ───────────────────────────────────────────────

/// Decide what a successful resolution response means.
///
/// Priority order:
/// 1. `Location` header (resolved against the API base)
/// 2. JSON body `{ "type": "REDIRECT", "targetUrl": ... }`
/// 3. final URL differs from the request URL (transport followed a
///    redirect transparently)
/// 4. `Content-Disposition` attachment / filename → download
/// 5. otherwise `Blocked` -- never an assumed outcome
pub(crate) fn classify_success(
    base_url: &Url,
    request_url: &Url,
    final_url: &Url,
    headers: &HeaderMap,
    body: Bytes,
) -> OpenOutcome {
    if let Some(location) = headers.get(LOCATION).and_then(|v| v.to_str().ok()) {
        if let Ok(target_url) = base_url.join(location) {
            return OpenOutcome::Redirected { target_url };
        }
    }

    if is_json(headers) {
        if let Some(target_url) = redirect_from_json(&body, base_url) {
            return OpenOutcome::Redirected { target_url };
        }
    }

    if final_url != request_url {
        return OpenOutcome::Redirected {
            target_url: final_url.clone(),
        };
    }

    if let Some(disposition) = headers.get(CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()) {
        if is_attachment(disposition) {
            let filename = filename_from_disposition(disposition)
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_owned());
            return OpenOutcome::FileDownload { bytes: body, filename };
        }
    }

    OpenOutcome::Blocked {
        reason: "resolution ambiguous".into(),
        resolved_url: None,
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.split(';').next().is_some_and(|m| {
            m.trim().eq_ignore_ascii_case("application/json")
        }))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedirectBody {
    #[serde(rename = "type")]
    kind: String,
    target_url: String,
}

fn redirect_from_json(body: &[u8], base_url: &Url) -> Option<Url> {
    let parsed = serde_json::from_slice::<RedirectBody>(body).ok()?;
    if !parsed.kind.eq_ignore_ascii_case("REDIRECT") {
        return None;
    }
    base_url.join(&parsed.target_url).ok()
}

// ── Content-Disposition parsing ──────────────────────────────────────

fn is_attachment(disposition: &str) -> bool {
    let lower = disposition.to_lowercase();
    lower.contains("attachment") || lower.contains("filename")
}

/// Extract a filename from a `Content-Disposition` value.
///
/// Handles both the plain `filename="x"` form and the RFC 5987
/// `filename*=UTF-8''x` form, percent-decoding the latter. The extended
/// form wins when both are present (RFC 6266 §4.3).
pub(crate) fn filename_from_disposition(disposition: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in disposition.split(';') {
        let param = param.trim();
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        if key == "filename*" {
            extended = decode_rfc5987(value);
        } else if key == "filename" {
            let unquoted = value.trim_matches('"');
            if !unquoted.is_empty() {
                plain = Some(unquoted.to_owned());
            }
        }
    }

    extended.or(plain)
}

/// Decode an RFC 5987 `charset'lang'percent-encoded` value.
fn decode_rfc5987(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _lang = parts.next()?;
    let encoded = parts.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }

    let decoded = percent_decode_str(encoded).decode_utf8().ok()?;
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    // ── ShortCode ────────────────────────────────────────────────────

    #[test]
    fn short_code_raw_token() {
        assert_eq!("aB3_-x".parse::<ShortCode>().unwrap().as_str(), "aB3_-x");
        assert_eq!("  code1  ".parse::<ShortCode>().unwrap().as_str(), "code1");
    }

    #[test]
    fn short_code_too_short_or_invalid() {
        assert!("abc".parse::<ShortCode>().is_err());
        assert!("ab cd".parse::<ShortCode>().is_err());
        assert!("".parse::<ShortCode>().is_err());
    }

    #[test]
    fn short_code_from_url() {
        let code: ShortCode = "https://links.example.com/l/xYz9_k".parse().unwrap();
        assert_eq!(code.as_str(), "xYz9_k");

        let code: ShortCode = "/l/abc123?utm=1".parse().unwrap();
        assert_eq!(code.as_str(), "abc123");
    }

    #[test]
    fn short_code_url_without_segment() {
        assert!("https://links.example.com/x/abc".parse::<ShortCode>().is_err());
        assert!("https://links.example.com/l/".parse::<ShortCode>().is_err());
    }

    // ── Content-Disposition ──────────────────────────────────────────

    #[test]
    fn filename_plain_quoted() {
        let name = filename_from_disposition(r#"attachment; filename="a b.pdf""#);
        assert_eq!(name.as_deref(), Some("a b.pdf"));
    }

    #[test]
    fn filename_rfc5987() {
        let name = filename_from_disposition("attachment; filename*=UTF-8''a%20b.pdf");
        assert_eq!(name.as_deref(), Some("a b.pdf"));
    }

    #[test]
    fn filename_extended_wins() {
        let name = filename_from_disposition(
            r#"attachment; filename="fallback.bin"; filename*=UTF-8''real%20name.bin"#,
        );
        assert_eq!(name.as_deref(), Some("real name.bin"));
    }

    #[test]
    fn filename_unparsable() {
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
        assert_eq!(
            filename_from_disposition("attachment; filename*=latin1''x"),
            None
        );
    }

    // ── classify_success ─────────────────────────────────────────────

    fn urls() -> (Url, Url) {
        let base = Url::parse("https://api.example.com/").unwrap();
        let request = base.join("l/abc123").unwrap();
        (base, request)
    }

    #[test]
    fn location_header_takes_priority() {
        let (base, request) = urls();
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/somewhere"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let outcome = classify_success(
            &base,
            &request,
            &request,
            &headers,
            Bytes::from_static(br#"{"type":"REDIRECT","targetUrl":"https://other.example/"}"#),
        );
        match outcome {
            OpenOutcome::Redirected { target_url } => {
                assert_eq!(target_url.as_str(), "https://api.example.com/somewhere");
            }
            other => panic!("expected Redirected, got {other:?}"),
        }
    }

    #[test]
    fn json_redirect_body() {
        let (base, request) = urls();
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );

        let outcome = classify_success(
            &base,
            &request,
            &request,
            &headers,
            Bytes::from_static(br#"{"type":"REDIRECT","targetUrl":"https://target.example/x"}"#),
        );
        match outcome {
            OpenOutcome::Redirected { target_url } => {
                assert_eq!(target_url.as_str(), "https://target.example/x");
            }
            other => panic!("expected Redirected, got {other:?}"),
        }
    }

    #[test]
    fn final_url_difference_means_followed_redirect() {
        let (base, request) = urls();
        let final_url = Url::parse("https://target.example/landing").unwrap();

        let outcome = classify_success(&base, &request, &final_url, &HeaderMap::new(), Bytes::new());
        match outcome {
            OpenOutcome::Redirected { target_url } => assert_eq!(target_url, final_url),
            other => panic!("expected Redirected, got {other:?}"),
        }
    }

    #[test]
    fn attachment_means_download() {
        let (base, request) = urls();
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static(r#"attachment; filename="doc.pdf""#),
        );

        let outcome = classify_success(
            &base,
            &request,
            &request,
            &headers,
            Bytes::from_static(b"%PDF"),
        );
        match outcome {
            OpenOutcome::FileDownload { bytes, filename } => {
                assert_eq!(filename, "doc.pdf");
                assert_eq!(&bytes[..], b"%PDF");
            }
            other => panic!("expected FileDownload, got {other:?}"),
        }
    }

    #[test]
    fn attachment_without_filename_uses_default() {
        let (base, request) = urls();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));

        let outcome = classify_success(&base, &request, &request, &headers, Bytes::new());
        match outcome {
            OpenOutcome::FileDownload { filename, .. } => {
                assert_eq!(filename, DEFAULT_DOWNLOAD_FILENAME);
            }
            other => panic!("expected FileDownload, got {other:?}"),
        }
    }

    #[test]
    fn undecidable_response_is_blocked() {
        let (base, request) = urls();
        let outcome = classify_success(
            &base,
            &request,
            &request,
            &HeaderMap::new(),
            Bytes::from_static(b"<html>hi</html>"),
        );
        match outcome {
            OpenOutcome::Blocked { reason, resolved_url } => {
                assert_eq!(reason, "resolution ambiguous");
                assert!(resolved_url.is_none());
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
    }
}
