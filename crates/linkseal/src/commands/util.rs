//! Shared helpers for command handlers.

use chrono::{DateTime, Utc};

use linkseal_core::LinkOptions;

use crate::cli::LinkOptionArgs;
use crate::error::CliError;

/// Parse an RFC3339 expiration timestamp.
pub fn parse_expires_at(value: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CliError::Validation {
            field: "expires-at".into(),
            reason: format!("invalid timestamp '{value}' (use RFC3339)"),
        })
}

/// Turn `--expires-at/--max-views/--protect/--password` flags into
/// [`LinkOptions`], prompting for a password when `--protect` was given.
pub fn resolve_link_options(args: &LinkOptionArgs) -> Result<LinkOptions, CliError> {
    let expires_at = args.expires_at.as_deref().map(parse_expires_at).transpose()?;

    let password = if args.protect {
        Some(prompt_new_password()?)
    } else {
        args.password.clone()
    };

    Ok(LinkOptions {
        expires_at,
        max_views: args.max_views,
        password,
    })
}

/// Prompt for a new link password (with confirmation).
fn prompt_new_password() -> Result<String, CliError> {
    let first = rpassword::prompt_password("Link password: ").map_err(|e| CliError::Io {
        action: "read password from",
        path: "terminal".into(),
        source: e,
    })?;
    let second = rpassword::prompt_password("Repeat password: ").map_err(|e| CliError::Io {
        action: "read password from",
        path: "terminal".into(),
        source: e,
    })?;
    if first != second {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    Ok(first)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io {
            action: "read confirmation from",
            path: "terminal".into(),
            source: std::io::Error::other(e),
        })
}
