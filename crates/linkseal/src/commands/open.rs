//! `open` handler: resolve a link into a redirect, a download, or a
//! password retry loop.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use secrecy::SecretString;

use linkseal_core::{LinkService, OpenOutcome};

use crate::cli::{GlobalOpts, OpenArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

/// Password prompts before giving up on a protected link.
const MAX_PASSWORD_PROMPTS: u32 = 3;

pub async fn handle(
    service: &LinkService,
    args: OpenArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let code = service.parse_short_code(&args.link)?;

    let mut password: Option<SecretString> = args.password.map(SecretString::from);
    let mut prompts_left = MAX_PASSWORD_PROMPTS;

    let outcome = loop {
        match service.open_link(&code, password.as_ref()).await? {
            OpenOutcome::PasswordRequired {
                attempted_with_password,
            } => {
                if attempted_with_password && !global.quiet {
                    eprintln!("Password rejected.");
                }
                if prompts_left == 0 || !io::stdin().is_terminal() {
                    return Err(CliError::PasswordGivenUp);
                }
                prompts_left -= 1;
                let entered =
                    rpassword::prompt_password("Link password: ").map_err(|e| CliError::Io {
                        action: "read password from",
                        path: "terminal".into(),
                        source: e,
                    })?;
                password = Some(SecretString::from(entered));
            }
            other => break other,
        }
    };

    match outcome {
        OpenOutcome::Redirected { target_url } => {
            let rendered = match global.output {
                OutputFormat::Table => format!("Redirects to: {target_url}"),
                OutputFormat::Json => output::render_json_pretty(&serde_json::json!({
                    "outcome": "redirected",
                    "targetUrl": target_url,
                })),
                OutputFormat::JsonCompact => output::render_json_compact(&serde_json::json!({
                    "outcome": "redirected",
                    "targetUrl": target_url,
                })),
                OutputFormat::Plain => target_url.to_string(),
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        OpenOutcome::FileDownload { bytes, filename } => {
            let path = args.out.unwrap_or_else(|| PathBuf::from(&filename));
            if path.exists()
                && !util::confirm(&format!("Overwrite {}?", path.display()), global.yes)?
            {
                return Err(CliError::Aborted);
            }
            tokio::fs::write(&path, &bytes).await.map_err(|e| CliError::Io {
                action: "write",
                path: path.display().to_string(),
                source: e,
            })?;

            let rendered = match global.output {
                OutputFormat::Table => {
                    format!("Saved {} ({} bytes)", path.display(), bytes.len())
                }
                OutputFormat::Json => output::render_json_pretty(&serde_json::json!({
                    "outcome": "file-download",
                    "path": path.display().to_string(),
                    "bytes": bytes.len(),
                })),
                OutputFormat::JsonCompact => output::render_json_compact(&serde_json::json!({
                    "outcome": "file-download",
                    "path": path.display().to_string(),
                    "bytes": bytes.len(),
                })),
                OutputFormat::Plain => path.display().to_string(),
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        OpenOutcome::Blocked {
            reason,
            resolved_url,
        } => {
            // Resolution succeeded server-side, so this is a warning,
            // not a failure: surface what we know and exit clean.
            if !global.quiet {
                match &resolved_url {
                    Some(url) => eprintln!("Blocked: {reason} (resolved to {url})"),
                    None => eprintln!("Blocked: {reason}"),
                }
            }
            if let Some(url) = resolved_url {
                let rendered = match global.output {
                    OutputFormat::Table => format!("Resolved URL: {url}"),
                    OutputFormat::Json => output::render_json_pretty(&serde_json::json!({
                        "outcome": "blocked",
                        "reason": reason,
                        "resolvedUrl": url,
                    })),
                    OutputFormat::JsonCompact => {
                        output::render_json_compact(&serde_json::json!({
                            "outcome": "blocked",
                            "reason": reason,
                            "resolvedUrl": url,
                        }))
                    }
                    OutputFormat::Plain => url.to_string(),
                };
                output::print_output(&rendered, global.quiet);
            }
            Ok(())
        }

        OpenOutcome::PasswordRequired { .. } => unreachable!("handled by the retry loop"),
    }
}
