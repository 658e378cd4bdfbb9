//! State store behaviour across reloads, corrupt storage and failing writes

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::tempdir;
use vault_encoding::ServiceRegistry;
use vault_state::{
    FileStore, KeyValueStore, ManualClock, MemoryStore, StateStore, StorageError, StoreConfig,
};

/// Storage handle the test keeps while the store owns a clone
#[derive(Clone, Default)]
struct SharedStore {
    inner: Rc<RefCell<MemoryStore>>,
    /// Writes to this key fail
    failing_key: Rc<RefCell<Option<String>>>,
}

impl SharedStore {
    fn with(store: MemoryStore) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
            ..Self::default()
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).ok().flatten()
    }

    fn fail_writes_to(&self, key: &str) {
        *self.failing_key.borrow_mut() = Some(key.to_string());
    }

    fn allow_writes(&self) {
        *self.failing_key.borrow_mut() = None;
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing_key.borrow().as_deref() == Some(key) {
            return Err(StorageError::Unavailable(format!("{} is read-only", key)));
        }
        self.inner.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.borrow_mut().remove(key)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.inner.borrow_mut().clear()
    }
}

const KEYS: [&str; 5] = [
    "proxy_visit_count",
    "proxy_last_service",
    "proxy_history",
    "proxy_favorites",
    "proxy_settings",
];

fn snapshot(storage: &SharedStore) -> Vec<Option<String>> {
    KEYS.iter().map(|key| storage.raw(key)).collect()
}

fn open(storage: &SharedStore) -> StateStore {
    StateStore::with_config(
        Box::new(storage.clone()),
        ServiceRegistry::builtin(),
        StoreConfig::default(),
        Box::new(ManualClock::new(1, 1)),
    )
}

#[test_log::test]
fn test_state_survives_reload() {
    let storage = SharedStore::default();
    {
        let mut store = open(&storage);
        store.increment_visit_count();
        store.increment_visit_count();
        store.set_active_service("rammerhead").expect("registered");
        store.record_history("example.com");
        store.add_favorite("https://example.com", Some("Example"));
    }

    let store = open(&storage);
    assert_eq!(store.visit_count(), 2);
    assert_eq!(store.active_service_id(), "rammerhead");
    assert_eq!(store.history().map(|e| e.url.as_str()).collect::<Vec<_>>(), vec!["example.com"]);
    assert_eq!(store.favorites()[0].title, "Example");
}

#[test]
fn test_persisted_layout() {
    let storage = SharedStore::default();
    let mut store = open(&storage);
    store.record_history("a.com");
    store.add_favorite("b.com", None);

    assert_eq!(storage.raw("proxy_visit_count").as_deref(), Some("0"));
    assert_eq!(storage.raw("proxy_last_service").as_deref(), Some("ultraviolet"));
    assert_eq!(
        storage.raw("proxy_history").as_deref(),
        Some(r#"[{"url":"a.com","timestamp":1,"service":"ultraviolet"}]"#)
    );
    assert_eq!(
        storage.raw("proxy_favorites").as_deref(),
        Some(r#"[{"url":"b.com","title":"b.com","timestamp":2}]"#)
    );
}

#[test_log::test]
fn test_corrupt_key_does_not_abort_load() {
    let mut seeded = MemoryStore::new();
    seeded.insert("proxy_visit_count", "7");
    seeded.insert("proxy_history", "[{broken");
    seeded.insert("proxy_favorites", r#"[{"url":"a","title":"A","timestamp":3}]"#);
    seeded.insert("proxy_settings", r#"{"blockAds": true}"#);

    let store = open(&SharedStore::with(seeded));
    assert_eq!(store.visit_count(), 7);
    assert_eq!(store.history_len(), 0);
    assert_eq!(store.favorites().len(), 1);
    assert!(store.settings().block_ads);
}

#[test_log::test]
fn test_non_numeric_visit_count_defaults_to_zero() {
    let mut seeded = MemoryStore::new();
    seeded.insert("proxy_visit_count", "lots");
    let store = open(&SharedStore::with(seeded));
    assert_eq!(store.visit_count(), 0);
}

#[test_log::test]
fn test_unknown_stored_service_is_replaced() {
    let mut seeded = MemoryStore::new();
    seeded.insert("proxy_last_service", "retired-proxy");
    let store = open(&SharedStore::with(seeded));
    assert_eq!(store.active_service_id(), "ultraviolet");
}

#[test]
fn test_settings_service_used_without_last_service_key() {
    let mut seeded = MemoryStore::new();
    seeded.insert("proxy_settings", r#"{"service": "nebula"}"#);
    let store = open(&SharedStore::with(seeded));
    assert_eq!(store.active_service_id(), "nebula");
}

#[test_log::test]
fn test_failed_write_keeps_memory_state() {
    let storage = SharedStore::with(MemoryStore::with_quota(64));
    let mut store = open(&storage);

    for n in 0..5 {
        store.record_history(&format!("https://site-number-{}.example.com", n));
    }

    assert_eq!(store.history_len(), 5);
    assert!(store.save().is_err());
}

#[test_log::test]
fn test_failed_save_restores_written_keys() {
    let storage = SharedStore::default();
    let mut store = open(&storage);
    store.record_history("a.com");
    let before = snapshot(&storage);

    storage.fail_writes_to("proxy_settings");
    let patch = serde_json::json!({"service": "womginx", "aboutBlank": true});
    store
        .merge_settings(patch.as_object().expect("object"))
        .expect("in-memory merge succeeds");

    assert_eq!(store.active_service_id(), "womginx");
    assert!(store.settings().open_in_detached_window);
    assert_eq!(snapshot(&storage), before);

    storage.allow_writes();
    let reloaded = open(&storage);
    assert_eq!(reloaded.active_service_id(), "ultraviolet");
    assert!(!reloaded.settings().open_in_detached_window);
}

#[test]
fn test_failed_first_save_leaves_storage_empty() {
    let storage = SharedStore::default();
    let mut store = open(&storage);

    storage.fail_writes_to("proxy_favorites");
    store.add_favorite("https://example.com", None);

    assert_eq!(store.favorites().len(), 1);
    assert_eq!(snapshot(&storage), vec![None; KEYS.len()]);
}

#[test]
fn test_visit_count_saturates() {
    let mut seeded = MemoryStore::new();
    seeded.insert("proxy_visit_count", &u64::MAX.to_string());
    let storage = SharedStore::with(seeded);
    let mut store = open(&storage);

    store.increment_visit_count();

    assert_eq!(store.visit_count(), u64::MAX);
    assert_eq!(storage.raw("proxy_visit_count"), Some(u64::MAX.to_string()));
}

#[test]
fn test_scenario_history_eviction() {
    let storage = SharedStore::default();
    let mut store = open(&storage);

    for n in 1..=51 {
        store.record_history(&format!("site{}.com", n));
    }

    let urls: Vec<_> = store.history().map(|e| e.url.clone()).collect();
    let expected: Vec<_> = (2..=51).rev().map(|n| format!("site{}.com", n)).collect();
    assert_eq!(urls.len(), 50);
    assert_eq!(urls, expected);
}

#[test]
fn test_favorite_uniqueness_and_round_trip() {
    let storage = SharedStore::default();
    let mut store = open(&storage);
    store.add_favorite("https://keep.com", None);
    let before = store.favorites().to_vec();

    assert!(store.add_favorite("https://u.com", Some("U")));
    assert!(!store.add_favorite("https://u.com", Some("Other")));
    assert_eq!(
        store.favorites().iter().filter(|f| f.url == "https://u.com").count(),
        1
    );

    assert_eq!(store.remove_favorite("https://u.com"), 1);
    assert_eq!(store.favorites(), before.as_slice());
}

#[test]
fn test_clear_all_resets_storage() {
    let storage = SharedStore::default();
    let mut store = open(&storage);
    store.increment_visit_count();
    store.add_favorite("a", None);

    store.clear_all().expect("memory store clears");
    assert_eq!(store.visit_count(), 0);
    assert!(store.favorites().is_empty());
    assert_eq!(storage.raw("proxy_visit_count"), None);
}

#[test]
fn test_file_backed_reload() {
    let dir = tempdir().expect("temp dir");
    {
        let storage = FileStore::open(dir.path()).expect("open");
        let mut store = StateStore::new(Box::new(storage), ServiceRegistry::builtin());
        store.increment_visit_count();
        store.add_favorite("https://example.com", None);
    }

    let storage = FileStore::open(dir.path()).expect("reopen");
    let store = StateStore::new(Box::new(storage), ServiceRegistry::builtin());
    assert_eq!(store.visit_count(), 1);
    assert_eq!(store.favorites().len(), 1);
}

proptest! {
    #[test]
    fn history_never_exceeds_limit(count in 0usize..120) {
        let storage = SharedStore::default();
        let mut store = open(&storage);
        for n in 0..count {
            store.record_history(&format!("site{}.com", n));
        }

        prop_assert!(store.history_len() <= 50);
        prop_assert_eq!(store.history_len(), count.min(50));

        let stamps: Vec<u64> = store.history().map(|e| e.timestamp).collect();
        prop_assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
    }
}
