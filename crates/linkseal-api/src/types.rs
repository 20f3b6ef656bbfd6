// Wire types for the secure-link API.
//
// The service speaks camelCase JSON. Statistics payloads are flat
// records/lists; list entries go through lenient decoding (see
// `SecureLinkClient::get_list_lenient`) so one malformed entry never
// poisons an otherwise good response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Link creation ────────────────────────────────────────────────────

/// Options shared by URL links and file uploads.
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<u32>,
    pub password: Option<String>,
}

/// Body for `POST /api/links`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub target_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl CreateLinkRequest {
    pub fn new(target_url: impl Into<String>, options: LinkOptions) -> Self {
        Self {
            target_url: target_url.into(),
            expires_at: options.expires_at,
            max_views: options.max_views,
            password: options.password,
        }
    }
}

/// Response from `POST /api/links` and `POST /api/links/upload`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCreated {
    pub short_code: String,
    pub access_url: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_views: Option<u32>,
}

// ── Statistics payloads ──────────────────────────────────────────────

/// `GET /api/stats/links` -- lifecycle counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCounts {
    pub active: u64,
    pub expired: u64,
    pub revoked: u64,
}

/// `GET /api/stats/access/summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSummary {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub expired: u64,
    pub unique_origins: u64,
}

/// One entry of `GET /api/stats/access/hourly`.
///
/// `hour` and `count` must both be numeric; entries that fail to
/// deserialize are dropped by the lenient list decoder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HourlyAccess {
    pub hour: u8,
    pub count: u64,
}

/// One entry of `GET /api/stats/access/daily`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAccess {
    pub access_date: String,
    pub count: u64,
}

/// One entry of `GET /api/stats/access/failures`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FailureCount {
    pub result: String,
    pub count: u64,
}

/// One entry of `GET /api/stats/links/top`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLink {
    pub short_code: String,
    pub access_count: u64,
}

/// One entry of `GET /api/stats/security/exceptions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityException {
    pub short_code: String,
    pub count: u64,
}
