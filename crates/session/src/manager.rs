//! Proxied-session manager
//!
//! Phases:
//!
//! - `Idle`: nothing loaded. `open` dispatches and moves to `Loading`.
//! - `Loading`: dispatched, waiting for the load timer. The timer moves the
//!   session to `Active`.
//! - `Active`: `reload`, `navigate_back`, `navigate_forward` and `close` are
//!   available. `close` returns to `Idle`.
//!
//! A formatting or dispatch failure while opening reports the error and
//! drops back to `Idle`; nothing is retried. Opening, reloading and closing
//! cancel whatever load timer is still pending.

use chrono::{DateTime, Utc};
use vault_encoding::{quick_links, try_format_for_service, ServiceDescriptor, ServiceRegistry};
use vault_state::{FavoriteEntry, HistoryEntry, Setting, StateStore};

use crate::config::SessionConfig;
use crate::document::DetachedDocument;
use crate::error::{ErrorKind, SessionError, SessionResult};
use crate::notify::{NotificationLevel, NotificationSink};
use crate::render::{RenderError, RenderTarget, WindowOpener};
use crate::timer::{LoadToken, Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Active,
}

/// Transient state of the current session. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Address as the user entered it
    pub current_url: Option<String>,
    /// Proxied address dispatched to the frame
    pub address: Option<String>,
    /// True while a load or reload timer is pending
    pub is_loading: bool,
}

/// Per-call overrides for [`SessionManager::open`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Force the detached window (`Some(true)`) or the embedded frame
    /// (`Some(false)`); `None` follows the persisted setting
    pub detached: Option<bool>,
}

impl OpenOptions {
    pub fn embedded() -> Self {
        Self { detached: Some(false) }
    }

    pub fn detached() -> Self {
        Self { detached: Some(true) }
    }
}

/// History entry prepared for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub url: String,
    pub visited_at: Option<DateTime<Utc>>,
    /// Display name of the service, or the raw id if it is no longer registered
    pub service_name: String,
}

/// Host-owned collaborators
pub struct SessionPorts {
    pub frame: Box<dyn RenderTarget>,
    pub windows: Box<dyn WindowOpener>,
    pub notifier: Box<dyn NotificationSink>,
    pub scheduler: Box<dyn Scheduler>,
}

struct PendingLoad {
    token: LoadToken,
    timer: Box<dyn TimerHandle>,
}

pub struct SessionManager {
    store: StateStore,
    ports: SessionPorts,
    config: SessionConfig,
    state: SessionState,
    pending: Option<PendingLoad>,
    next_token: u64,
}

impl SessionManager {
    pub fn new(store: StateStore, ports: SessionPorts, config: SessionConfig) -> Self {
        log::info!(
            "Session manager ready: {} visits, service {}",
            store.visit_count(),
            store.active_service_id()
        );
        Self {
            store,
            ports,
            config,
            state: SessionState::default(),
            pending: None,
            next_token: 0,
        }
    }

    /// Open `url` through the active service.
    ///
    /// Returns the proxied address that was dispatched.
    pub fn open(&mut self, url: &str, options: OpenOptions) -> SessionResult<String> {
        let url = url.trim();
        if url.is_empty() {
            self.notify("Please enter a valid URL", NotificationLevel::Warning);
            return Err(SessionError::EmptyUrl);
        }

        let detached = options
            .detached
            .unwrap_or(self.store.settings().open_in_detached_window);

        if detached {
            self.open_detached(url)
        } else {
            self.open_in_frame(url)
        }
    }

    /// Open one of the built-in quick links by name
    pub fn open_quick_link(&mut self, name: &str, options: OpenOptions) -> SessionResult<String> {
        match quick_links::find(name) {
            Some(link) => self.open(link.url, options),
            None => {
                self.notify(&format!("Unknown shortcut: {}", name), NotificationLevel::Warning);
                Err(SessionError::UnknownQuickLink(name.to_string()))
            }
        }
    }

    fn open_in_frame(&mut self, url: &str) -> SessionResult<String> {
        self.cancel_pending();
        self.state.phase = SessionPhase::Loading;
        self.state.is_loading = true;

        let address = match self.dispatch_to_frame(url) {
            Ok(address) => address,
            Err(err) => {
                self.fail_open(url, &err);
                return Err(err);
            }
        };

        self.state.current_url = Some(url.to_string());
        self.state.address = Some(address.clone());
        self.store.increment_visit_count();
        self.store.record_history(url);
        self.schedule_loading_finished(self.config.load_delay());

        log::info!(
            "Loading {} via {}: {}",
            url,
            self.store.active_service_id(),
            address
        );
        self.notify(&format!("Loading {}", url), NotificationLevel::Success);
        Ok(address)
    }

    fn dispatch_to_frame(&mut self, url: &str) -> SessionResult<String> {
        let address =
            try_format_for_service(self.store.registry(), url, self.store.active_service_id())?;
        self.ports.frame.navigate(&address)?;
        Ok(address)
    }

    fn fail_open(&mut self, url: &str, err: &SessionError) {
        log::error!("Failed to load {}: {}", url, err);
        self.cancel_pending();
        self.ports.frame.clear();
        self.state = SessionState::default();
        let level = match err.kind() {
            ErrorKind::UnknownService => NotificationLevel::Error,
            _ => NotificationLevel::Warning,
        };
        self.notify(&format!("Failed to load: {}", err), level);
    }

    /// Detached windows live outside the session; the current frame session
    /// is left as it is.
    fn open_detached(&mut self, url: &str) -> SessionResult<String> {
        let formatted =
            try_format_for_service(self.store.registry(), url, self.store.active_service_id());
        let address = match formatted {
            Ok(address) => address,
            Err(err) => {
                let err = SessionError::from(err);
                log::error!("Failed to format {}: {}", url, err);
                self.notify(&format!("Failed to open window: {}", err), NotificationLevel::Error);
                return Err(err);
            }
        };

        let document = DetachedDocument::new(
            &self.config.detached_title,
            &self.config.detached_icon,
            &address,
        );
        if let Err(err) = self.ports.windows.open(&document) {
            log::warn!("Detached window for {} refused: {}", url, err);
            return Err(match err {
                RenderError::PopupBlocked => {
                    self.notify("Popup blocked! Please allow popups", NotificationLevel::Error);
                    SessionError::PopupBlocked
                }
                other => {
                    self.notify(
                        &format!("Failed to open window: {}", other),
                        NotificationLevel::Error,
                    );
                    SessionError::Dispatch(other)
                }
            });
        }

        self.store.increment_visit_count();
        self.store.record_history(url);

        log::info!("Opened {} in a detached window: {}", url, address);
        self.notify("Opened in detached window", NotificationLevel::Success);
        Ok(address)
    }

    /// Called by the host when a scheduled load timer fires.
    ///
    /// Returns false for tokens the session is no longer waiting on.
    pub fn finish_loading(&mut self, token: LoadToken) -> bool {
        let is_current = self.pending.as_ref().map_or(false, |p| p.token == token);
        if !is_current {
            log::debug!("Ignoring stale {}", token);
            return false;
        }

        self.pending = None;
        self.state.is_loading = false;
        if self.state.phase == SessionPhase::Loading {
            self.state.phase = SessionPhase::Active;
        }
        log::debug!("{} finished, session {:?}", token, self.state.phase);
        true
    }

    /// Re-dispatch the current address to the frame
    pub fn reload(&mut self) -> SessionResult<()> {
        let address = match self.state.address.clone() {
            Some(address) if self.state.phase != SessionPhase::Idle => address,
            _ => {
                self.notify("No page to reload", NotificationLevel::Warning);
                return Err(SessionError::NoActiveSession);
            }
        };

        if let Err(err) = self.ports.frame.navigate(&address) {
            log::warn!("Reload of {} refused: {}", address, err);
            self.notify("Reload failed", NotificationLevel::Warning);
            return Err(err.into());
        }

        self.cancel_pending();
        self.state.is_loading = true;
        self.schedule_loading_finished(self.config.reload_delay());
        log::info!("Reloaded {}", address);
        self.notify("Page reloaded", NotificationLevel::Success);
        Ok(())
    }

    /// Step the frame's history back. Refusals are reported to the user and
    /// yield false.
    pub fn navigate_back(&mut self) -> bool {
        self.navigate_history(true)
    }

    pub fn navigate_forward(&mut self) -> bool {
        self.navigate_history(false)
    }

    fn navigate_history(&mut self, back: bool) -> bool {
        let direction = if back { "back" } else { "forward" };

        if self.state.phase == SessionPhase::Idle {
            self.notify(&format!("Cannot navigate {}", direction), NotificationLevel::Warning);
            return false;
        }

        let result = if back {
            self.ports.frame.go_back()
        } else {
            self.ports.frame.go_forward()
        };

        match result {
            Ok(()) => {
                self.notify(&format!("Navigated {}", direction), NotificationLevel::Success);
                true
            }
            Err(err) => {
                log::warn!("Navigation {} failed: {}", direction, err);
                self.notify(&format!("Cannot navigate {}", direction), NotificationLevel::Warning);
                false
            }
        }
    }

    /// Blank the frame and return to idle
    pub fn close(&mut self) {
        self.cancel_pending();
        self.ports.frame.clear();
        self.state = SessionState::default();
        log::info!("Session closed");
        self.notify("Proxy closed", NotificationLevel::Info);
    }

    /// Page-unload hook: drop the session without touching the UI
    pub fn unload(&mut self) {
        self.cancel_pending();
        self.state = SessionState::default();
    }

    /// Route future sessions through `service_id`. A loaded session keeps
    /// its address.
    pub fn change_service(&mut self, service_id: &str) -> SessionResult<()> {
        if let Err(err) = self.store.set_active_service(service_id) {
            log::error!("Cannot switch to {}: {}", service_id, err);
            self.notify("Invalid proxy service", NotificationLevel::Error);
            return Err(err.into());
        }

        let name = self.store.active_service().display_name.clone();
        log::info!("Proxy service changed to {}", service_id);
        self.notify(&format!("Switched to {}", name), NotificationLevel::Success);
        Ok(())
    }

    pub fn update_setting(&mut self, setting: Setting) -> SessionResult<()> {
        if let Err(err) = self.store.update_setting(setting) {
            self.notify(&format!("Could not save setting: {}", err), NotificationLevel::Error);
            return Err(err.into());
        }
        Ok(())
    }

    /// Add the loaded page to favorites. `Ok(false)` means it already was one.
    pub fn favorite_current(&mut self, title: Option<&str>) -> SessionResult<bool> {
        let Some(url) = self.state.current_url.clone() else {
            self.notify("No active page to bookmark", NotificationLevel::Warning);
            return Err(SessionError::NoActiveSession);
        };

        let added = self.store.add_favorite(&url, title);
        if added {
            self.notify("Added to favorites", NotificationLevel::Success);
        } else {
            self.notify("Already in favorites", NotificationLevel::Info);
        }
        Ok(added)
    }

    /// Remove the favorite at `index` in [`favorites`](Self::favorites)
    pub fn remove_favorite_at(&mut self, index: usize) -> bool {
        let Some(url) = self.store.favorite_at(index).map(|f| f.url.clone()) else {
            return false;
        };

        self.store.remove_favorite(&url);
        self.notify("Removed from favorites", NotificationLevel::Success);
        true
    }

    pub fn clear_history(&mut self) {
        self.store.clear_history();
        self.notify("History cleared", NotificationLevel::Success);
    }

    /// Close the session and wipe every persisted key
    pub fn clear_all_data(&mut self) -> SessionResult<()> {
        self.cancel_pending();
        self.ports.frame.clear();
        self.state = SessionState::default();

        if let Err(err) = self.store.clear_all() {
            log::error!("Failed to clear storage: {}", err);
            self.notify("Could not clear stored data", NotificationLevel::Warning);
            return Err(err.into());
        }
        self.notify("All data cleared", NotificationLevel::Success);
        Ok(())
    }

    fn schedule_loading_finished(&mut self, delay: std::time::Duration) {
        self.next_token += 1;
        let token = LoadToken::new(self.next_token);
        let timer = self.ports.scheduler.schedule(delay, token);
        self.pending = Some(PendingLoad { token, timer });
    }

    fn cancel_pending(&mut self) {
        if let Some(mut pending) = self.pending.take() {
            log::debug!("Canceling {}", pending.token);
            pending.timer.cancel();
        }
    }

    fn notify(&mut self, message: &str, level: NotificationLevel) {
        self.ports.notifier.notify(message, level);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn visit_count(&self) -> u64 {
        self.store.visit_count()
    }

    /// Newest history entries, as many as the UI shows
    pub fn recent_history(&self) -> Vec<&HistoryEntry> {
        self.store
            .recent_history(self.config.recent_history_limit)
            .collect()
    }

    pub fn history_rows(&self) -> Vec<HistoryRow> {
        let registry = self.store.registry();
        self.recent_history()
            .into_iter()
            .map(|entry| HistoryRow {
                url: entry.url.clone(),
                visited_at: entry.visited_at(),
                service_name: registry
                    .lookup(&entry.service_id)
                    .map(|s| s.display_name.clone())
                    .unwrap_or_else(|| entry.service_id.clone()),
            })
            .collect()
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        self.store.favorites()
    }

    pub fn active_service(&self) -> &ServiceDescriptor {
        self.store.active_service()
    }

    pub fn services(&self) -> &ServiceRegistry {
        self.store.registry()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
