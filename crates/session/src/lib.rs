//! Sage's Vault session crate
//!
//! Drives one proxied session at a time: formats the address for the active
//! service, hands it to an embedded frame or a detached window, keeps the
//! state store up to date and reports every outcome to a notification sink.
//!
//! The host owns every collaborator and passes them in through
//! [`SessionPorts`]; nothing here reaches for globals.

pub mod config;
pub mod document;
pub mod error;
pub mod manager;
pub mod notify;
pub mod render;
pub mod timer;

pub use config::SessionConfig;
pub use document::DetachedDocument;
pub use error::{ErrorKind, SessionError, SessionResult};
pub use manager::{
    HistoryRow, OpenOptions, SessionManager, SessionPhase, SessionPorts, SessionState,
};
pub use notify::{LogNotifier, NotificationLevel, NotificationSink};
pub use render::{RenderError, RenderTarget, WindowOpener};
pub use timer::{LoadToken, Scheduler, TimerHandle, TokioScheduler};
