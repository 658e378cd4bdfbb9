//! In-memory fakes for the session ports

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use vault_encoding::ServiceRegistry;
use vault_session::{
    DetachedDocument, LoadToken, NotificationLevel, NotificationSink, RenderError, RenderTarget,
    Scheduler, SessionConfig, SessionManager, SessionPorts, TimerHandle, WindowOpener,
};
use vault_state::{ManualClock, MemoryStore, StateStore, StoreConfig};

#[derive(Debug, Default)]
pub struct FrameLog {
    pub navigations: Vec<String>,
    pub clears: usize,
    pub backs: usize,
    pub forwards: usize,
    /// Frame exposes its history (same-origin content)
    pub history_allowed: bool,
    /// Refuse every navigation
    pub reject: bool,
}

pub struct FakeFrame(pub Rc<RefCell<FrameLog>>);

impl RenderTarget for FakeFrame {
    fn navigate(&mut self, address: &str) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        if log.reject {
            return Err(RenderError::Rejected {
                address: address.to_string(),
                reason: "sandboxed".to_string(),
            });
        }
        log.navigations.push(address.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clears += 1;
    }

    fn go_back(&mut self) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        if !log.history_allowed {
            return Err(RenderError::HistoryUnavailable);
        }
        log.backs += 1;
        Ok(())
    }

    fn go_forward(&mut self) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        if !log.history_allowed {
            return Err(RenderError::HistoryUnavailable);
        }
        log.forwards += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct WindowLog {
    pub documents: Vec<String>,
    pub blocked: bool,
    /// Refuse for a reason other than a popup blocker
    pub rejected: bool,
}

pub struct FakeWindows(pub Rc<RefCell<WindowLog>>);

impl WindowOpener for FakeWindows {
    fn open(&mut self, document: &DetachedDocument<'_>) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        if log.blocked {
            return Err(RenderError::PopupBlocked);
        }
        if log.rejected {
            return Err(RenderError::Rejected {
                address: document.address.to_string(),
                reason: "window limit reached".to_string(),
            });
        }
        log.documents.push(document.render());
        Ok(())
    }
}

pub struct RecordingNotifier(pub Rc<RefCell<Vec<(String, NotificationLevel)>>>);

impl NotificationSink for RecordingNotifier {
    fn notify(&mut self, message: &str, level: NotificationLevel) {
        self.0.borrow_mut().push((message.to_string(), level));
    }
}

pub struct ScheduledTimer {
    pub delay: Duration,
    pub token: LoadToken,
    pub canceled: Rc<Cell<bool>>,
}

/// Records timers; the test decides when they fire
pub struct ManualScheduler(pub Rc<RefCell<Vec<ScheduledTimer>>>);

struct ManualTimer(Rc<Cell<bool>>);

impl TimerHandle for ManualTimer {
    fn cancel(&mut self) {
        self.0.set(true);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, token: LoadToken) -> Box<dyn TimerHandle> {
        let canceled = Rc::new(Cell::new(false));
        self.0.borrow_mut().push(ScheduledTimer {
            delay,
            token,
            canceled: canceled.clone(),
        });
        Box::new(ManualTimer(canceled))
    }
}

pub struct Harness {
    pub manager: SessionManager,
    pub frame: Rc<RefCell<FrameLog>>,
    pub windows: Rc<RefCell<WindowLog>>,
    pub notices: Rc<RefCell<Vec<(String, NotificationLevel)>>>,
    pub timers: Rc<RefCell<Vec<ScheduledTimer>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(MemoryStore::new())
    }

    pub fn with_storage(storage: MemoryStore) -> Self {
        let frame = Rc::new(RefCell::new(FrameLog::default()));
        let windows = Rc::new(RefCell::new(WindowLog::default()));
        let notices = Rc::new(RefCell::new(Vec::new()));
        let timers = Rc::new(RefCell::new(Vec::new()));

        let store = StateStore::with_config(
            Box::new(storage),
            ServiceRegistry::builtin(),
            StoreConfig::default(),
            Box::new(ManualClock::new(1_700_000_000_000, 1000)),
        );
        let ports = SessionPorts {
            frame: Box::new(FakeFrame(frame.clone())),
            windows: Box::new(FakeWindows(windows.clone())),
            notifier: Box::new(RecordingNotifier(notices.clone())),
            scheduler: Box::new(ManualScheduler(timers.clone())),
        };

        Self {
            manager: SessionManager::new(store, ports, SessionConfig::default()),
            frame,
            windows,
            notices,
            timers,
        }
    }

    pub fn last_notice(&self) -> Option<(String, NotificationLevel)> {
        self.notices.borrow().last().cloned()
    }

    pub fn last_timer(&self) -> Option<(Duration, LoadToken)> {
        self.timers.borrow().last().map(|t| (t.delay, t.token))
    }

    /// Fire every timer that has not been canceled, in scheduling order
    pub fn fire_timers(&mut self) -> Vec<bool> {
        let live: Vec<LoadToken> = self
            .timers
            .borrow_mut()
            .drain(..)
            .filter(|t| !t.canceled.get())
            .map(|t| t.token)
            .collect();
        live.into_iter()
            .map(|token| self.manager.finish_loading(token))
            .collect()
    }
}
