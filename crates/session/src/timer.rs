//! Cancelable "loading finished" timers
//!
//! The embedded frame gives no reliable load-completion signal, so a session
//! counts as loaded once a fixed delay has passed since dispatch. Each
//! scheduled delay carries a [`LoadToken`]; the host hands fired tokens back
//! to [`SessionManager::finish_loading`](crate::SessionManager::finish_loading),
//! which ignores any token it is no longer waiting for.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one scheduled load completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

pub trait TimerHandle {
    /// Stop the timer from firing. Canceling a fired timer does nothing.
    fn cancel(&mut self);
}

pub trait Scheduler {
    /// Deliver `token` back to the host once `delay` has elapsed
    fn schedule(&mut self, delay: Duration, token: LoadToken) -> Box<dyn TimerHandle>;
}

/// Scheduler backed by tokio timers.
///
/// Fired tokens arrive on the receiver returned by [`TokioScheduler::new`].
/// `schedule` must be called from inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<LoadToken>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LoadToken>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, token: LoadToken) -> Box<dyn TimerHandle> {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if sender.send(token).is_err() {
                log::debug!("Dropping {}: session receiver is gone", token);
            }
        });
        Box::new(TokioTimer { task })
    }
}

struct TokioTimer {
    task: JoinHandle<()>,
}

impl TimerHandle for TokioTimer {
    fn cancel(&mut self) {
        self.task.abort();
    }
}
