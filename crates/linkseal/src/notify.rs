//! Terminal notification sink.

use owo_colors::OwoColorize;

use linkseal_core::{NoticeKind, NotificationSink};

/// Writes notices to stderr, colored when the terminal supports it.
pub struct TermSink {
    use_color: bool,
    quiet: bool,
}

impl TermSink {
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }
}

impl NotificationSink for TermSink {
    fn notify(&self, kind: NoticeKind, title: &str, message: &str) {
        // Errors always surface; the rest respect --quiet.
        if self.quiet && kind != NoticeKind::Error {
            return;
        }
        let label = match kind {
            NoticeKind::Error => "error",
            NoticeKind::Warning => "warning",
            NoticeKind::Info => "info",
            NoticeKind::Success => "ok",
        };
        if self.use_color {
            let label = match kind {
                NoticeKind::Error => format!("{}", label.red().bold()),
                NoticeKind::Warning => format!("{}", label.yellow().bold()),
                NoticeKind::Info => format!("{}", label.blue().bold()),
                NoticeKind::Success => format!("{}", label.green().bold()),
            };
            eprintln!("{label}: {title}: {message}");
        } else {
            eprintln!("{label}: {title}: {message}");
        }
    }
}
