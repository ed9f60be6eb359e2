//! User-facing notices.
//!
//! The offline core reports what happened to the user through a small,
//! closed set of [`Notice`] values handed to a [`Notifier`]. Rendering is
//! left to the notifier: the CLI prints colored lines, tests record them.

use std::cell::RefCell;

use colored::Colorize;
use serde::Serialize;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A notice emitted by the offline core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// A mutation was stored locally for later sync.
    Queued,
    /// Connectivity was lost.
    Offline,
    /// Connectivity returned and a drain is starting.
    BackOnline,
    /// A drain removed `count` mutations from the queue.
    Synced { count: usize },
}

impl Notice {
    /// Severity used when rendering.
    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::Queued => NoticeLevel::Info,
            Self::Offline => NoticeLevel::Error,
            Self::BackOnline | Self::Synced { .. } => NoticeLevel::Success,
        }
    }

    /// Message text shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Queued => "Change saved. Will sync when online.".to_string(),
            Self::Offline => {
                "You are offline. Changes will be saved and synced when connection returns."
                    .to_string()
            },
            Self::BackOnline => "Back online! Syncing changes...".to_string(),
            Self::Synced { count } => format!("Synced {count} change(s)"),
        }
    }

    /// Message with a colored severity marker.
    #[must_use]
    pub fn render(&self) -> String {
        let message = self.message();
        match self.level() {
            NoticeLevel::Info => format!("{} {}", "ℹ".blue(), message),
            NoticeLevel::Success => format!("{} {}", "✓".green(), message.green()),
            NoticeLevel::Error => format!("{} {}", "✗".red(), message.red()),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Receiver of user-facing notices.
pub trait Notifier {
    /// Present `notice` to the user.
    fn notify(&self, notice: &Notice);
}

/// Prints notices to stderr as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("{}", notice.render());
    }
}

/// Collects notices in arrival order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: RefCell<Vec<Notice>>,
}

impl NoticeLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Notice::Queued.message(),
            "Change saved. Will sync when online."
        );
        assert_eq!(Notice::Synced { count: 3 }.message(), "Synced 3 change(s)");
        assert_eq!(Notice::Offline.level(), NoticeLevel::Error);
        assert_eq!(Notice::BackOnline.level(), NoticeLevel::Success);
    }

    #[test]
    fn test_notice_log_records_in_order() {
        let log = NoticeLog::new();
        log.notify(&Notice::Offline);
        log.notify(&Notice::Queued);

        assert_eq!(log.notices(), vec![Notice::Offline, Notice::Queued]);
        assert_eq!(log.take().len(), 2);
        assert!(log.notices().is_empty());
    }

    #[test]
    fn test_notice_serializes_with_kind() {
        let json = serde_json::to_string(&Notice::Synced { count: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"synced","count":2}"#);
    }
}
