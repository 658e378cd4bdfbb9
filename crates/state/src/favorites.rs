//! Favorites list
//!
//! At most one entry per exact URL string. Insertion order is kept and there
//! is no cap.

use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub url: String,
    pub title: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Favorites {
    entries: Vec<FavoriteEntry>,
}

impl Favorites {
    /// Rebuild from persisted entries. Later duplicates of a URL are dropped.
    pub fn from_entries(entries: Vec<FavoriteEntry>) -> Self {
        let mut favorites = Self::default();
        for entry in entries {
            if !favorites.add(entry.clone()) {
                log::warn!("Dropping duplicate stored favorite: {}", entry.url);
            }
        }
        favorites
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|f| f.url == url)
    }

    /// Append `entry` unless its URL is already present
    pub fn add(&mut self, entry: FavoriteEntry) -> bool {
        if self.contains(&entry.url) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Remove every entry with exactly this URL, returning how many went
    pub fn remove(&mut self, url: &str) -> usize {
        let original_len = self.entries.len();
        self.entries.retain(|f| f.url != url);
        original_len - self.entries.len()
    }

    pub fn get(&self, index: usize) -> Option<&FavoriteEntry> {
        self.entries.get(index)
    }

    pub fn as_slice(&self) -> &[FavoriteEntry] {
        &self.entries
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
}
