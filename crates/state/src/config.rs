//! Store configuration
//!
//! Key names match the layout earlier releases wrote, so existing browser
//! storage keeps loading.

use serde::{Serialize, Deserialize};

/// Default number of history entries retained
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Persisted key names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub visit_count: String,
    pub last_service: String,
    pub history: String,
    pub favorites: String,
    pub settings: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            visit_count: "proxy_visit_count".to_string(),
            last_service: "proxy_last_service".to_string(),
            history: "proxy_history".to_string(),
            favorites: "proxy_favorites".to_string(),
            settings: "proxy_settings".to_string(),
        }
    }
}

/// Configuration for the [`StateStore`](crate::StateStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum history entries kept, newest first
    pub history_limit: usize,
    pub keys: StorageKeys,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            keys: StorageKeys::default(),
        }
    }
}
