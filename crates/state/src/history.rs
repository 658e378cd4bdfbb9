//! Bounded proxied-visit history
//!
//! Newest entries sit at the front. Once the limit is reached every new
//! record evicts the oldest one.

use std::collections::VecDeque;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Deserialize};

/// One opened address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Address as the user entered it
    pub url: String,
    /// Epoch milliseconds when the entry was recorded
    pub timestamp: u64,
    /// Service the address was routed through
    #[serde(rename = "service")]
    pub service_id: String,
}

impl HistoryEntry {
    pub fn visited_at(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.timestamp).ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Rebuild from persisted entries, dropping anything past the limit
    pub fn from_entries(entries: Vec<HistoryEntry>, limit: usize) -> Self {
        let mut entries = VecDeque::from(entries);
        entries.truncate(limit);
        Self { entries, limit }
    }

    /// Put `entry` at the front and evict from the back past the limit
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    /// Up to `limit` most recent entries, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().take(limit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}
