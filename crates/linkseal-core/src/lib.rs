// linkseal-core: business logic for the secure-link client.
//
// Owns the statistics aggregator (fan-out, completion barrier, refresh
// cycle staleness guard, cancellable poller) and the LinkService facade
// that the CLI drives. Transport details stay in linkseal-api.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod service;

pub use aggregator::StatsAggregator;
pub use config::ServiceConfig;
pub use error::CoreError;
pub use model::{StatKind, StatsSnapshot};
pub use notify::{NoticeKind, NotificationSink, TracingSink};
pub use service::{LinkService, RevokeOutcome};

// Re-exported so consumers don't need a direct linkseal-api dependency
// for the common types.
pub use linkseal_api::types::{LinkCreated, LinkOptions};
pub use linkseal_api::{ApiError, ErrorKind, OpenOutcome, ShortCode};
