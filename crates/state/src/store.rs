//! Persistent state store
//!
//! Owns the visit counter, history, favorites and settings. Every mutation
//! applies in memory first and then writes the full state back through the
//! [`KeyValueStore`]. Storage failures are logged and never undo the
//! in-memory change; the in-memory copy stays authoritative for the rest of
//! the session.

use serde::de::DeserializeOwned;
use vault_encoding::{ServiceDescriptor, ServiceRegistry};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{StateError, StateResult, StorageError};
use crate::favorites::{FavoriteEntry, Favorites};
use crate::history::{History, HistoryEntry};
use crate::settings::{Setting, Settings};
use crate::storage::KeyValueStore;

pub struct StateStore {
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    registry: ServiceRegistry,
    config: StoreConfig,
    visit_count: u64,
    history: History,
    favorites: Favorites,
    settings: Settings,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("visit_count", &self.visit_count)
            .field("history", &self.history.len())
            .field("favorites", &self.favorites.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl StateStore {
    /// Load state with the default configuration and the system clock
    pub fn new(storage: Box<dyn KeyValueStore>, registry: ServiceRegistry) -> Self {
        Self::with_config(storage, registry, StoreConfig::default(), Box::new(SystemClock))
    }

    /// Load state from `storage`.
    ///
    /// Each key is read independently: a missing or corrupt key keeps its
    /// default and does not affect the others.
    pub fn with_config(
        storage: Box<dyn KeyValueStore>,
        registry: ServiceRegistry,
        config: StoreConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut store = Self {
            storage,
            clock,
            settings: Self::default_settings(&registry),
            registry,
            history: History::new(config.history_limit),
            favorites: Favorites::default(),
            visit_count: 0,
            config,
        };
        store.load();
        store
    }

    fn default_settings(registry: &ServiceRegistry) -> Settings {
        Settings {
            active_service_id: registry.default_service().id.clone(),
            ..Settings::default()
        }
    }

    fn load(&mut self) {
        let keys = self.config.keys.clone();

        if let Some(raw) = self.read_key(&keys.visit_count) {
            match raw.trim().parse::<u64>() {
                Ok(count) => self.visit_count = count,
                Err(err) => log::warn!("Ignoring stored visit count {:?}: {}", raw, err),
            }
        }

        if let Some(entries) = self.parse_key::<Vec<HistoryEntry>>(&keys.history) {
            self.history = History::from_entries(entries, self.config.history_limit);
        }

        if let Some(entries) = self.parse_key::<Vec<FavoriteEntry>>(&keys.favorites) {
            self.favorites = Favorites::from_entries(entries);
        }

        if let Some(settings) = self.parse_key::<Settings>(&keys.settings) {
            self.settings = settings;
        }

        // the last-service key wins over the copy inside the settings object
        if let Some(service) = self.read_key(&keys.last_service) {
            self.settings.active_service_id = service;
        }

        if !self.registry.contains(&self.settings.active_service_id) {
            let fallback = self.registry.default_service().id.clone();
            log::warn!(
                "Stored service {:?} is not registered, using {}",
                self.settings.active_service_id,
                fallback
            );
            self.settings.active_service_id = fallback;
        }

        log::info!(
            "Loaded proxy state: {} visits, {} history entries, {} favorites, service {}",
            self.visit_count,
            self.history.len(),
            self.favorites.len(),
            self.settings.active_service_id
        );
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Failed to read {}: {}", key, err);
                None
            }
        }
    }

    fn parse_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_key(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring malformed {}: {}", key, err);
                None
            }
        }
    }

    /// Write the full state through the storage port.
    ///
    /// Every value is serialized before the first write, and a write that
    /// fails part way restores the keys already written, so storage holds
    /// either the old state or the new one.
    pub fn save(&mut self) -> StateResult<()> {
        let keys = &self.config.keys;
        let writes = [
            (keys.visit_count.as_str(), self.visit_count.to_string()),
            (keys.last_service.as_str(), self.settings.active_service_id.clone()),
            (
                keys.history.as_str(),
                serde_json::to_string(&self.history.to_vec()).map_err(StorageError::from)?,
            ),
            (
                keys.favorites.as_str(),
                serde_json::to_string(self.favorites.as_slice()).map_err(StorageError::from)?,
            ),
            (
                keys.settings.as_str(),
                serde_json::to_string(&self.settings).map_err(StorageError::from)?,
            ),
        ];

        let mut previous = Vec::with_capacity(writes.len());
        for (key, _) in &writes {
            previous.push(self.storage.get(key)?);
        }

        for (index, (key, value)) in writes.iter().enumerate() {
            if let Err(err) = self.storage.set(key, value) {
                Self::roll_back(&mut *self.storage, &writes[..index], &previous[..index]);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Put back what storage held before a save that failed part way
    fn roll_back(
        storage: &mut dyn KeyValueStore,
        written: &[(&str, String)],
        previous: &[Option<String>],
    ) {
        for ((key, _), old) in written.iter().zip(previous).rev() {
            let restored = match old {
                Some(value) => storage.set(key, value),
                None => storage.remove(key),
            };
            if let Err(err) = restored {
                log::error!("Failed to restore {} after an aborted save: {}", key, err);
            }
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.save() {
            log::error!("Failed to save proxy state: {}", err);
        }
    }

    pub fn increment_visit_count(&mut self) {
        self.visit_count = self.visit_count.saturating_add(1);
        self.persist();
    }

    /// Record `url` at the front of history under the active service.
    ///
    /// Returns false without touching anything when history is disabled.
    pub fn record_history(&mut self, url: &str) -> bool {
        if !self.settings.persist_history {
            return false;
        }

        self.history.record(HistoryEntry {
            url: url.to_string(),
            timestamp: self.clock.now_millis(),
            service_id: self.settings.active_service_id.clone(),
        });
        self.persist();
        true
    }

    /// Add a favorite unless one with exactly this URL exists.
    ///
    /// The title defaults to the URL.
    pub fn add_favorite(&mut self, url: &str, title: Option<&str>) -> bool {
        let added = self.favorites.add(FavoriteEntry {
            url: url.to_string(),
            title: title.unwrap_or(url).to_string(),
            timestamp: self.clock.now_millis(),
        });
        if added {
            self.persist();
        }
        added
    }

    /// Remove every favorite with exactly this URL
    pub fn remove_favorite(&mut self, url: &str) -> usize {
        let removed = self.favorites.remove(url);
        self.persist();
        removed
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    /// Change one setting. An unregistered service id is rejected and
    /// nothing changes.
    pub fn update_setting(&mut self, setting: Setting) -> StateResult<()> {
        if let Setting::ActiveService(id) = &setting {
            self.validate_service(id)?;
        }
        self.settings.apply(setting);
        self.persist();
        Ok(())
    }

    pub fn set_active_service(&mut self, service_id: &str) -> StateResult<()> {
        self.update_setting(Setting::ActiveService(service_id.to_string()))
    }

    /// Replace all settings at once
    pub fn replace_settings(&mut self, settings: Settings) -> StateResult<()> {
        self.validate_service(&settings.active_service_id)?;
        self.settings = settings;
        self.persist();
        Ok(())
    }

    /// Shallow-merge a JSON object into the current settings
    pub fn merge_settings(
        &mut self,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> StateResult<()> {
        let merged = self
            .settings
            .merged_with(patch)
            .map_err(|e| StateError::InvalidSettings(e.to_string()))?;
        self.replace_settings(merged)
    }

    /// Wipe the storage layer and reset everything to defaults.
    ///
    /// The in-memory reset happens even if the storage clear fails.
    pub fn clear_all(&mut self) -> StateResult<()> {
        self.visit_count = 0;
        self.history.clear();
        self.favorites.clear();
        self.settings = Self::default_settings(&self.registry);
        self.storage.clear()?;
        log::info!("Cleared all proxy state");
        Ok(())
    }

    fn validate_service(&self, service_id: &str) -> StateResult<()> {
        if self.registry.contains(service_id) {
            Ok(())
        } else {
            Err(StateError::UnknownService(service_id.to_string()))
        }
    }

    pub fn visit_count(&self) -> u64 {
        self.visit_count
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active_service_id(&self) -> &str {
        &self.settings.active_service_id
    }

    /// Descriptor of the active service; the id is validated on every write
    pub fn active_service(&self) -> &ServiceDescriptor {
        self.registry
            .lookup(&self.settings.active_service_id)
            .unwrap_or_else(|| self.registry.default_service())
    }

    /// Full history, newest first
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    /// The `limit` newest history entries
    pub fn recent_history(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.history.recent(limit)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        self.favorites.as_slice()
    }

    pub fn favorite_at(&self, index: usize) -> Option<&FavoriteEntry> {
        self.favorites.get(index)
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
