// Statistics domain model.
//
// The snapshot keeps one slot per stat kind. Slots start empty, are
// overwritten field-by-field as refresh cycles complete, and are never
// cleared by a failed query -- a failure keeps the previous value and
// flags the cycle as partial.

use chrono::{DateTime, Utc};
use serde::Serialize;

use linkseal_api::types::{
    AccessSummary, DailyAccess, FailureCount, HourlyAccess, LinkCounts, SecurityException, TopLink,
};

/// The seven independent statistics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    LinkCounts,
    AccessSummary,
    HourlyAccess,
    DailyAccess,
    FailureBreakdown,
    TopLinks,
    SecurityExceptions,
}

impl StatKind {
    pub const ALL: [Self; 7] = [
        Self::LinkCounts,
        Self::AccessSummary,
        Self::HourlyAccess,
        Self::DailyAccess,
        Self::FailureBreakdown,
        Self::TopLinks,
        Self::SecurityExceptions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkCounts => "link-counts",
            Self::AccessSummary => "access-summary",
            Self::HourlyAccess => "hourly-access",
            Self::DailyAccess => "daily-access",
            Self::FailureBreakdown => "failure-breakdown",
            Self::TopLinks => "top-links",
            Self::SecurityExceptions => "security-exceptions",
        }
    }
}

/// A successfully fetched payload for one stat kind.
#[derive(Debug, Clone)]
pub enum StatPayload {
    LinkCounts(LinkCounts),
    AccessSummary(AccessSummary),
    HourlyAccess(Vec<HourlyAccess>),
    DailyAccess(Vec<DailyAccess>),
    FailureBreakdown(Vec<FailureCount>),
    TopLinks(Vec<TopLink>),
    SecurityExceptions(Vec<SecurityException>),
}

/// Consolidated statistics state, one instance per aggregator.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub link_counts: Option<LinkCounts>,
    pub access_summary: Option<AccessSummary>,
    pub hourly: Vec<HourlyAccess>,
    pub daily: Vec<DailyAccess>,
    pub failures: Vec<FailureCount>,
    pub top_links: Vec<TopLink>,
    pub security_exceptions: Vec<SecurityException>,

    /// When the last refresh cycle fully settled.
    pub updated_at: Option<DateTime<Utc>>,

    /// At least one query of the last settled cycle failed; its slot
    /// retains the previous value.
    pub partial_failure: bool,

    /// A refresh cycle requested with a loading indicator is in flight.
    pub is_loading: bool,

    /// Reachability of the service, derived from the link-counts query.
    /// `None` until the first cycle settles that query.
    pub online: Option<bool>,
}

impl StatsSnapshot {
    /// Store one payload, applying presentation ordering where defined:
    /// hourly ascending by hour of day, daily lexicographically by date.
    pub(crate) fn apply(&mut self, payload: StatPayload) {
        match payload {
            StatPayload::LinkCounts(counts) => self.link_counts = Some(counts),
            StatPayload::AccessSummary(summary) => self.access_summary = Some(summary),
            StatPayload::HourlyAccess(mut entries) => {
                entries.sort_by_key(|e| e.hour);
                self.hourly = entries;
            }
            StatPayload::DailyAccess(mut entries) => {
                entries.sort_by(|a, b| a.access_date.cmp(&b.access_date));
                self.daily = entries;
            }
            StatPayload::FailureBreakdown(entries) => self.failures = entries,
            StatPayload::TopLinks(entries) => self.top_links = entries,
            StatPayload::SecurityExceptions(entries) => self.security_exceptions = entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn one_kind_per_query() {
        assert_eq!(StatKind::ALL.len(), 7);
    }

    #[test]
    fn hourly_sorted_ascending_on_apply() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.apply(StatPayload::HourlyAccess(vec![
            HourlyAccess { hour: 17, count: 2 },
            HourlyAccess { hour: 3, count: 9 },
            HourlyAccess { hour: 11, count: 1 },
        ]));
        let hours: Vec<u8> = snapshot.hourly.iter().map(|e| e.hour).collect();
        assert_eq!(hours, vec![3, 11, 17]);
    }

    #[test]
    fn daily_sorted_lexicographically_on_apply() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.apply(StatPayload::DailyAccess(vec![
            DailyAccess {
                access_date: "2025-03-02".into(),
                count: 1,
            },
            DailyAccess {
                access_date: "2025-02-28".into(),
                count: 4,
            },
        ]));
        assert_eq!(snapshot.daily[0].access_date, "2025-02-28");
        assert_eq!(snapshot.daily[1].access_date, "2025-03-02");
    }
}
