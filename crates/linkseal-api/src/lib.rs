// linkseal-api: async Rust client for the secure-link service HTTP API

pub mod client;
pub mod error;
pub mod resolve;
pub mod transport;
pub mod types;

pub use client::SecureLinkClient;
pub use error::{ApiError, ErrorKind, PasswordChallenge};
pub use resolve::{OpenOutcome, ShortCode};
pub use transport::TransportConfig;
