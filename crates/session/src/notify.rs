//! User-facing notifications
//!
//! The session reports every state change through a [`NotificationSink`].
//! Delivery is fire-and-forget; the session never waits on the sink.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Error => write!(f, "error"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Info => write!(f, "info"),
        }
    }
}

pub trait NotificationSink {
    fn notify(&mut self, message: &str, level: NotificationLevel);
}

/// Sink for headless hosts: notifications become log records
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, message: &str, level: NotificationLevel) {
        match level {
            NotificationLevel::Success | NotificationLevel::Info => {
                log::info!("[{}] {}", level, message)
            }
            NotificationLevel::Warning => log::warn!("{}", message),
            NotificationLevel::Error => log::error!("{}", message),
        }
    }
}
