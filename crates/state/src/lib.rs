//! Sage's Vault state crate
//!
//! Durable client-side state: visit counter, active service, bounded history,
//! favorites and user settings. The [`StateStore`] is the only writer of these
//! keys and talks to storage exclusively through the [`KeyValueStore`] port,
//! so hosts can back it with browser storage, a file, or memory.

pub mod clock;
pub mod config;
pub mod error;
pub mod favorites;
pub mod history;
pub mod settings;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StorageKeys, StoreConfig};
pub use error::{StateError, StateResult, StorageError};
pub use favorites::FavoriteEntry;
pub use history::HistoryEntry;
pub use settings::{Setting, Settings};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::StateStore;
