//! CLI error types with miette diagnostics.
//!
//! Maps normalized API errors into user-facing diagnostics with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use linkseal_core::{ApiError, CoreError, ErrorKind};

/// Exit codes, stable for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const GONE: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration / input ────────────────────────────────────────
    #[error("No profile named '{profile}' and no --server given")]
    #[diagnostic(
        code(linkseal::no_profile),
        help(
            "Add a profile to {path}:\n\n\
             [profiles.{profile}]\n\
             server = \"https://links.example.com\"\n\n\
             Or pass --server / set LINKSEAL_SERVER."
        )
    )]
    NoProfile { profile: String, path: String },

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(linkseal::validation))]
    Validation { field: String, reason: String },

    #[error("Not a short code or /l/{{code}} URL: {input:?}")]
    #[diagnostic(
        code(linkseal::invalid_link),
        help("Pass either the bare short code (at least 4 characters of\n\
              [A-Za-z0-9_-]) or the full link URL.")
    )]
    InvalidLink { input: String },

    // ── API failures ─────────────────────────────────────────────────
    #[error("{}", .0.message_with_correlation())]
    #[diagnostic(code(linkseal::api))]
    Api(ApiError),

    #[error("Password rejected too many times")]
    #[diagnostic(
        code(linkseal::password_rejected),
        help("Check the password with whoever shared the link.")
    )]
    PasswordGivenUp,

    // ── Local I/O ────────────────────────────────────────────────────
    #[error("Cannot {action} {path}")]
    #[diagnostic(code(linkseal::io))]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Aborted")]
    #[diagnostic(code(linkseal::aborted))]
    Aborted,
}

impl CliError {
    /// Exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoProfile { .. } | Self::Validation { .. } | Self::InvalidLink { .. } => {
                exit_code::USAGE
            }
            Self::Api(err) => match err.kind {
                ErrorKind::Unauthorized => exit_code::AUTH,
                ErrorKind::NotFound => exit_code::NOT_FOUND,
                ErrorKind::Gone => exit_code::GONE,
                ErrorKind::NetworkUnreachable => exit_code::CONNECTION,
                _ => exit_code::GENERAL,
            },
            Self::PasswordGivenUp => exit_code::AUTH,
            Self::Io { .. } | Self::Aborted => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidShortCode { input } => Self::InvalidLink { input },
            CoreError::Api(api) => Self::Api(api),
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
