//! User settings
//!
//! Stored as one JSON object. Loading merges shallowly over the defaults:
//! unknown keys are ignored and missing keys keep their default value.

use serde::{Serialize, Deserialize};
use vault_encoding::DEFAULT_SERVICE_ID;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Service new sessions are routed through
    #[serde(rename = "service")]
    pub active_service_id: String,
    /// Open sessions in a detached window instead of the embedded frame
    #[serde(rename = "aboutBlank")]
    pub open_in_detached_window: bool,
    /// Record opened addresses in history
    #[serde(rename = "saveHistory")]
    pub persist_history: bool,
    #[serde(rename = "autoReload")]
    pub auto_reload: bool,
    #[serde(rename = "blockAds")]
    pub block_ads: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            active_service_id: DEFAULT_SERVICE_ID.to_string(),
            open_in_detached_window: false,
            persist_history: true,
            auto_reload: false,
            block_ads: false,
        }
    }
}

/// A single settings field with its new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    ActiveService(String),
    OpenInDetachedWindow(bool),
    PersistHistory(bool),
    AutoReload(bool),
    BlockAds(bool),
}

impl Settings {
    /// Overwrite one field. Service ids are validated by the store, not here.
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::ActiveService(id) => self.active_service_id = id,
            Setting::OpenInDetachedWindow(value) => self.open_in_detached_window = value,
            Setting::PersistHistory(value) => self.persist_history = value,
            Setting::AutoReload(value) => self.auto_reload = value,
            Setting::BlockAds(value) => self.block_ads = value,
        }
    }

    /// Shallow-merge a JSON object over these settings.
    ///
    /// Keys present in `patch` replace the current value, absent keys are
    /// left alone and unknown keys are dropped.
    pub fn merged_with(
        &self,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Settings, serde_json::Error> {
        let mut current = match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        for (key, value) in patch {
            current.insert(key.clone(), value.clone());
        }
        serde_json::from_value(serde_json::Value::Object(current))
    }
}
