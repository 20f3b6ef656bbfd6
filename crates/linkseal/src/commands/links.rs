//! Link lifecycle handlers: create, upload, revoke.

use linkseal_core::{LinkCreated, LinkService, RevokeOutcome};

use crate::cli::{CreateArgs, GlobalOpts, RevokeArgs, UploadArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn create(
    service: &LinkService,
    args: CreateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = util::resolve_link_options(&args.options)?;
    let created = service.create_link(&args.target_url, options).await?;

    output::print_output(
        &output::render_single(&global.output, &created, created_detail, created_id),
        global.quiet,
    );
    Ok(())
}

pub async fn upload(
    service: &LinkService,
    args: UploadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = util::resolve_link_options(&args.options)?;

    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::Validation {
            field: "file".into(),
            reason: format!("{} has no usable filename", args.file.display()),
        })?;
    let contents = tokio::fs::read(&args.file).await.map_err(|e| CliError::Io {
        action: "read",
        path: args.file.display().to_string(),
        source: e,
    })?;

    let created = service.upload_link(&filename, contents, &options).await?;

    output::print_output(
        &output::render_single(&global.output, &created, created_detail, created_id),
        global.quiet,
    );
    Ok(())
}

pub async fn revoke(
    service: &LinkService,
    args: RevokeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let code = service.parse_short_code(&args.link)?;

    if !util::confirm(
        &format!("Revoke link '{code}'? Anyone holding it loses access."),
        global.yes,
    )? {
        return Err(CliError::Aborted);
    }

    match service.revoke_link(&code).await? {
        RevokeOutcome::Revoked => {
            if !global.quiet {
                eprintln!("Link '{code}' revoked");
            }
        }
        RevokeOutcome::AlreadyAbsent => {
            if !global.quiet {
                eprintln!("Link '{code}' not found (already revoked or expired)");
            }
        }
    }
    Ok(())
}

// ── Rendering ────────────────────────────────────────────────────────

fn created_detail(created: &LinkCreated) -> String {
    let mut lines = vec![
        format!("Short code:  {}", created.short_code),
        format!("Access URL:  {}", created.access_url),
    ];
    if let Some(expires_at) = created.expires_at {
        lines.push(format!("Expires at:  {}", expires_at.to_rfc3339()));
    }
    if let Some(max_views) = created.max_views {
        lines.push(format!("Max views:   {max_views}"));
    }
    lines.join("\n")
}

fn created_id(created: &LinkCreated) -> String {
    created.access_url.clone()
}
