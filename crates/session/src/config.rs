//! Session configuration

use std::time::Duration;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time after dispatch before a new session counts as loaded
    pub load_delay_ms: u64,
    /// Time after a reload before the loading flag clears
    pub reload_delay_ms: u64,
    /// History rows handed to the UI
    pub recent_history_limit: usize,
    /// Title of the detached window, so the tab blends in
    pub detached_title: String,
    /// Favicon of the detached window
    pub detached_icon: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            load_delay_ms: 2000,
            reload_delay_ms: 1500,
            recent_history_limit: 10,
            detached_title: "Google Classroom".to_string(),
            detached_icon: "https://ssl.gstatic.com/classroom/ic_product_classroom_32.png"
                .to_string(),
        }
    }
}

impl SessionConfig {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}
