//! `stats` handler: one-shot snapshot or a live polling watch.

use owo_colors::OwoColorize;
use tabled::Tabled;

use linkseal_core::{LinkService, StatsAggregator, StatsSnapshot};

use crate::cli::{GlobalOpts, OutputFormat, StatsArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    service: &LinkService,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // The aggregator honors the profile's limit by default; the flag
    // wins when given.
    let aggregator = StatsAggregator::new(service.client().clone(), args.limit);
    let use_color = output::should_color(&global.color);

    if args.watch {
        watch(&aggregator, service, global, use_color).await;
    } else {
        aggregator.refresh(true).await;
        let rendered = render_snapshot(&aggregator.snapshot(), &global.output, use_color);
        output::print_output(&rendered, global.quiet);
    }
    Ok(())
}

/// Poll until Ctrl-C, re-rendering each settled refresh cycle.
async fn watch(
    aggregator: &StatsAggregator,
    service: &LinkService,
    global: &GlobalOpts,
    use_color: bool,
) {
    aggregator.start(service.config().poll_interval);
    let mut rx = aggregator.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if snapshot.is_loading || snapshot.updated_at.is_none() {
                    continue;
                }
                if matches!(global.output, OutputFormat::Table) && !global.quiet {
                    // Redraw in place.
                    print!("\x1b[2J\x1b[H");
                }
                let rendered = render_snapshot(&snapshot, &global.output, use_color);
                output::print_output(&rendered, global.quiet);
            }
        }
    }

    aggregator.dispose();
}

// ── Rendering ────────────────────────────────────────────────────────

fn render_snapshot(snapshot: &StatsSnapshot, format: &OutputFormat, use_color: bool) -> String {
    match format {
        OutputFormat::Json => output::render_json_pretty(snapshot),
        OutputFormat::JsonCompact => output::render_json_compact(snapshot),
        OutputFormat::Plain => render_plain(snapshot),
        OutputFormat::Table => render_tables(snapshot, use_color),
    }
}

fn render_plain(snapshot: &StatsSnapshot) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "online {}",
        snapshot
            .online
            .map_or_else(|| "unknown".into(), |b| b.to_string())
    ));
    lines.push(format!("partial_failure {}", snapshot.partial_failure));
    if let Some(updated_at) = snapshot.updated_at {
        lines.push(format!("updated_at {}", updated_at.to_rfc3339()));
    }
    if let Some(ref counts) = snapshot.link_counts {
        lines.push(format!("links_active {}", counts.active));
        lines.push(format!("links_expired {}", counts.expired));
        lines.push(format!("links_revoked {}", counts.revoked));
    }
    if let Some(ref summary) = snapshot.access_summary {
        lines.push(format!("access_total {}", summary.total));
        lines.push(format!("access_success {}", summary.success));
        lines.push(format!("access_failed {}", summary.failed));
        lines.push(format!("access_expired {}", summary.expired));
        lines.push(format!("unique_origins {}", summary.unique_origins));
    }
    lines.join("\n")
}

fn render_tables(snapshot: &StatsSnapshot, use_color: bool) -> String {
    let mut sections = Vec::new();

    sections.push(status_line(snapshot, use_color));

    if let Some(ref counts) = snapshot.link_counts {
        sections.push(section(
            "Links",
            output::render_table(&[CountsRow {
                active: counts.active,
                expired: counts.expired,
                revoked: counts.revoked,
            }]),
            use_color,
        ));
    }

    if let Some(ref summary) = snapshot.access_summary {
        sections.push(section(
            "Access",
            output::render_table(&[SummaryRow {
                total: summary.total,
                success: summary.success,
                failed: summary.failed,
                expired: summary.expired,
                unique_origins: summary.unique_origins,
            }]),
            use_color,
        ));
    }

    if !snapshot.hourly.is_empty() {
        let rows: Vec<HourlyRow> = snapshot
            .hourly
            .iter()
            .map(|e| HourlyRow {
                hour: format!("{:02}:00", e.hour),
                count: e.count,
            })
            .collect();
        sections.push(section("By hour", output::render_table(&rows), use_color));
    }

    if !snapshot.daily.is_empty() {
        let rows: Vec<DailyRow> = snapshot
            .daily
            .iter()
            .map(|e| DailyRow {
                date: e.access_date.clone(),
                count: e.count,
            })
            .collect();
        sections.push(section("By day", output::render_table(&rows), use_color));
    }

    if !snapshot.failures.is_empty() {
        let rows: Vec<FailureRow> = snapshot
            .failures
            .iter()
            .map(|e| FailureRow {
                result: e.result.clone(),
                count: e.count,
            })
            .collect();
        sections.push(section("Failures", output::render_table(&rows), use_color));
    }

    if !snapshot.top_links.is_empty() {
        let rows: Vec<TopRow> = snapshot
            .top_links
            .iter()
            .map(|e| TopRow {
                short_code: e.short_code.clone(),
                accesses: e.access_count,
            })
            .collect();
        sections.push(section("Top links", output::render_table(&rows), use_color));
    }

    if !snapshot.security_exceptions.is_empty() {
        let rows: Vec<SecurityRow> = snapshot
            .security_exceptions
            .iter()
            .map(|e| SecurityRow {
                short_code: e.short_code.clone(),
                rejections: e.count,
            })
            .collect();
        sections.push(section(
            "Password rejections",
            output::render_table(&rows),
            use_color,
        ));
    }

    sections.join("\n\n")
}

fn status_line(snapshot: &StatsSnapshot, use_color: bool) -> String {
    let online = match snapshot.online {
        Some(true) if use_color => format!("{}", "online".green()),
        Some(true) => "online".into(),
        Some(false) if use_color => format!("{}", "offline".red()),
        Some(false) => "offline".into(),
        None => "unknown".into(),
    };
    let updated = snapshot
        .updated_at
        .map_or_else(|| "never".into(), |t| t.to_rfc3339());

    let mut line = format!("Service {online} - updated {updated}");
    if snapshot.partial_failure {
        let warning = "some queries failed; stale values shown";
        if use_color {
            line.push_str(&format!("\n{}", warning.yellow()));
        } else {
            line.push_str(&format!("\n{warning}"));
        }
    }
    line
}

fn section(title: &str, body: String, use_color: bool) -> String {
    if use_color {
        format!("{}\n{body}", title.bold())
    } else {
        format!("{title}\n{body}")
    }
}

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CountsRow {
    #[tabled(rename = "Active")]
    active: u64,
    #[tabled(rename = "Expired")]
    expired: u64,
    #[tabled(rename = "Revoked")]
    revoked: u64,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Total")]
    total: u64,
    #[tabled(rename = "Success")]
    success: u64,
    #[tabled(rename = "Failed")]
    failed: u64,
    #[tabled(rename = "Expired")]
    expired: u64,
    #[tabled(rename = "Unique origins")]
    unique_origins: u64,
}

#[derive(Tabled)]
struct HourlyRow {
    #[tabled(rename = "Hour")]
    hour: String,
    #[tabled(rename = "Accesses")]
    count: u64,
}

#[derive(Tabled)]
struct DailyRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Accesses")]
    count: u64,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Count")]
    count: u64,
}

#[derive(Tabled)]
struct TopRow {
    #[tabled(rename = "Short code")]
    short_code: String,
    #[tabled(rename = "Accesses")]
    accesses: u64,
}

#[derive(Tabled)]
struct SecurityRow {
    #[tabled(rename = "Short code")]
    short_code: String,
    #[tabled(rename = "Rejections")]
    rejections: u64,
}
