// Notification sink seam.
//
// The UI layer (toast outlet, terminal, whatever) implements this trait;
// the core only promises to hand over a (kind, title, message) triple.

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Warning,
    Info,
    Success,
}

/// Receives user-facing notifications from the core.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NoticeKind, title: &str, message: &str);
}

/// Default sink: routes notices into the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NoticeKind, title: &str, message: &str) {
        match kind {
            NoticeKind::Error => error!(title, message),
            NoticeKind::Warning => warn!(title, message),
            NoticeKind::Info | NoticeKind::Success => info!(title, message),
        }
    }
}
