use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{KeyValueStorage, StorageError};

/// Fixed storage key for the persisted watchlist.
pub const WATCHLIST_KEY: &str = "myList";

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("failed to read watchlist from storage")]
    Read(#[source] StorageError),
    #[error("stored watchlist is not a valid list of ids")]
    Decode(#[source] serde_json::Error),
    #[error("failed to write watchlist to storage")]
    Write(#[source] StorageError),
}

/// The user's "My List": an ordered, duplicate-free sequence of movie ids
/// mirrored to durable storage as a JSON array of strings.
///
/// Constructed explicitly and passed to whatever needs it; there is no
/// global instance. Call [`load`](Self::load) once per session before
/// reading, since construction does not hydrate.
///
/// Durability contract: `toggle` writes storage first and commits the
/// in-memory sequence only after the write succeeds, so on a write failure
/// the in-memory list is rolled back (left unchanged) rather than allowed
/// to diverge from disk. The state sits behind a mutex held across the
/// whole read-compute-write-commit step, so back-to-back toggles cannot
/// lose updates.
pub struct WatchlistStore<S> {
    storage: S,
    state: Mutex<Vec<String>>,
}

impl<S: KeyValueStorage> WatchlistStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: Mutex::new(Vec::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, Vec<String>> {
        // A poisoned lock means another thread panicked while holding it;
        // the list itself is still a committed, valid value, so keep it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hydrate the in-memory sequence from durable storage.
    ///
    /// An absent value or the literal text `null` hydrates to an empty
    /// list. Undecodable text also hydrates to empty but reports the
    /// decode failure, so callers can show it and still proceed.
    pub fn load(&self) -> Result<(), WatchlistError> {
        let mut state = self.state();
        let raw = match self.storage.get(WATCHLIST_KEY) {
            Ok(raw) => raw,
            Err(e) => return Err(WatchlistError::Read(e)),
        };

        let Some(raw) = raw else {
            debug!("no persisted watchlist, starting empty");
            *state = Vec::new();
            return Ok(());
        };

        match serde_json::from_str::<Option<Vec<String>>>(&raw) {
            Ok(parsed) => {
                *state = dedupe(parsed.unwrap_or_default());
                debug!("hydrated watchlist with {} ids", state.len());
                Ok(())
            }
            Err(e) => {
                warn!("persisted watchlist is undecodable, falling back to empty: {e}");
                *state = Vec::new();
                Err(WatchlistError::Decode(e))
            }
        }
    }

    /// Set-symmetric membership toggle: removes `id` if present, appends it
    /// otherwise. Persists the new sequence, then commits it in memory.
    /// Returns whether `id` is a member after the toggle.
    pub fn toggle(&self, id: &str) -> Result<bool, WatchlistError> {
        let mut state = self.state();

        let was_member = state.iter().any(|entry| entry == id);
        let updated: Vec<String> = if was_member {
            state.iter().filter(|entry| *entry != id).cloned().collect()
        } else {
            let mut list = state.clone();
            list.push(id.to_string());
            list
        };

        // Display on a JSON array of strings cannot fail, so the write is
        // the only fallible step.
        let encoded = serde_json::Value::from(updated.clone()).to_string();
        self.storage
            .set(WATCHLIST_KEY, &encoded)
            .map_err(WatchlistError::Write)?;

        *state = updated;
        debug!(
            "toggled `{}` {} the watchlist ({} ids)",
            id,
            if was_member { "out of" } else { "into" },
            state.len()
        );
        Ok(!was_member)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state().iter().any(|entry| entry == id)
    }

    /// Current sequence, in insertion order.
    pub fn entries(&self) -> Vec<String> {
        self.state().clone()
    }

    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().is_empty()
    }
}

/// Drop repeated ids, keeping the first occurrence. Persisted data is the
/// only way duplicates can appear; `toggle` never produces them.
fn dedupe(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let before = ids.len();
    let out: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    if out.len() != before {
        warn!("dropped {} duplicate watchlist ids", before - out.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStorage;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// In-memory storage with injectable write failure.
    #[derive(Default)]
    struct MemoryStorage {
        values: Mutex<HashMap<String, String>>,
        fail_writes: AtomicBool,
    }

    impl MemoryStorage {
        fn seeded(raw: &str) -> Self {
            let storage = Self::default();
            storage
                .values
                .lock()
                .unwrap()
                .insert(WATCHLIST_KEY.to_string(), raw.to_string());
            storage
        }

        fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn persisted(&self) -> Option<String> {
            self.values.lock().unwrap().get(WATCHLIST_KEY).cloned()
        }
    }

    impl KeyValueStorage for MemoryStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Write {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "storage quota exceeded"),
                });
            }
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_toggle_on_empty_list_appends() {
        let store = WatchlistStore::new(MemoryStorage::default());
        store.load().unwrap();

        assert!(store.toggle("m1").unwrap());
        assert_eq!(store.entries(), vec!["m1"]);
        assert_eq!(store.storage.persisted().as_deref(), Some(r#"["m1"]"#));
    }

    #[test]
    fn test_toggle_removes_existing_member() {
        let store = WatchlistStore::new(MemoryStorage::seeded(r#"["m1","m2"]"#));
        store.load().unwrap();

        assert!(!store.toggle("m1").unwrap());
        assert_eq!(store.entries(), vec!["m2"]);
        assert_eq!(store.storage.persisted().as_deref(), Some(r#"["m2"]"#));
    }

    #[test]
    fn test_toggle_appends_at_end() {
        let store = WatchlistStore::new(MemoryStorage::seeded(r#"["m2"]"#));
        store.load().unwrap();

        assert!(store.toggle("m1").unwrap());
        assert_eq!(store.entries(), vec!["m2", "m1"]);
    }

    #[test]
    fn test_double_toggle_restores_sequence() {
        let store = WatchlistStore::new(MemoryStorage::seeded(r#"["m1","m2","m3"]"#));
        store.load().unwrap();

        store.toggle("m2").unwrap();
        store.toggle("m2").unwrap();
        // m2 re-enters at the end; the others keep their relative order
        assert_eq!(store.entries(), vec!["m1", "m3", "m2"]);

        store.toggle("m4").unwrap();
        store.toggle("m4").unwrap();
        assert_eq!(store.entries(), vec!["m1", "m3", "m2"]);
    }

    #[test]
    fn test_membership_inversion() {
        let store = WatchlistStore::new(MemoryStorage::seeded(r#"["m1","m3"]"#));
        store.load().unwrap();

        for id in ["m1", "m2", "m3", "m4"] {
            let before = store.contains(id);
            let now_member = store.toggle(id).unwrap();
            assert_eq!(now_member, !before);
            assert_eq!(store.contains(id), !before);
        }
    }

    #[test]
    fn test_no_duplicates_after_toggle_chain() {
        let store = WatchlistStore::new(MemoryStorage::default());
        store.load().unwrap();

        for id in ["m1", "m2", "m1", "m3", "m2", "m2", "m1"] {
            store.toggle(id).unwrap();
        }
        let entries = store.entries();
        let unique: std::collections::HashSet<_> = entries.iter().collect();
        assert_eq!(unique.len(), entries.len());
    }

    #[test]
    fn test_absent_value_hydrates_empty() {
        let store = WatchlistStore::new(MemoryStorage::default());
        store.load().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_literal_null_hydrates_empty() {
        let store = WatchlistStore::new(MemoryStorage::seeded("null"));
        store.load().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_undecodable_value_reports_and_falls_back_empty() {
        let store = WatchlistStore::new(MemoryStorage::seeded("{definitely not json"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, WatchlistError::Decode(_)));
        // Fallback still leaves a usable empty list
        assert!(store.is_empty());
        assert!(store.toggle("m1").unwrap());
        assert_eq!(store.entries(), vec!["m1"]);
    }

    #[test]
    fn test_persisted_duplicates_are_dropped_on_load() {
        let store = WatchlistStore::new(MemoryStorage::seeded(r#"["m1","m2","m1","m3","m2"]"#));
        store.load().unwrap();
        assert_eq!(store.entries(), vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_write_failure_rolls_back_memory() {
        let store = WatchlistStore::new(MemoryStorage::seeded(r#"["m1"]"#));
        store.load().unwrap();

        store.storage.fail_writes(true);
        let err = store.toggle("m3").unwrap_err();
        assert!(matches!(err, WatchlistError::Write(_)));
        assert_eq!(store.entries(), vec!["m1"]);
        assert_eq!(store.storage.persisted().as_deref(), Some(r#"["m1"]"#));

        // Recovery: the same toggle succeeds once storage does
        store.storage.fail_writes(false);
        assert!(store.toggle("m3").unwrap());
        assert_eq!(store.entries(), vec!["m1", "m3"]);
    }

    #[test]
    fn test_concurrent_toggles_lose_no_updates() {
        use std::sync::Arc;

        let store = Arc::new(WatchlistStore::new(MemoryStorage::default()));
        store.load().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for k in 0..10 {
                        store.toggle(&format!("m{n}-{k}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every toggle was an insert of a distinct id; none may be lost
        let entries = store.entries();
        assert_eq!(entries.len(), 80);
        let unique: std::collections::HashSet<_> = entries.iter().collect();
        assert_eq!(unique.len(), entries.len());

        // The last committed write and the in-memory sequence agree
        let persisted: Vec<String> =
            serde_json::from_str(&store.storage.persisted().unwrap()).unwrap();
        assert_eq!(persisted, entries);
    }

    #[test]
    fn test_round_trip_across_restart() {
        let dir = TempDir::new().unwrap();

        let store = WatchlistStore::new(FileStorage::new(dir.path()).unwrap());
        store.load().unwrap();
        store.toggle("m2").unwrap();
        store.toggle("m1").unwrap();
        store.toggle("m9").unwrap();
        store.toggle("m9").unwrap();
        let before = store.entries();
        drop(store);

        // Fresh store over the same directory simulates a process restart
        let revived = WatchlistStore::new(FileStorage::new(dir.path()).unwrap());
        revived.load().unwrap();
        assert_eq!(revived.entries(), before);
        assert_eq!(revived.entries(), vec!["m2", "m1"]);
    }

    #[test]
    fn test_read_failure_surfaces() {
        struct BrokenStorage;
        impl KeyValueStorage for BrokenStorage {
            fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
                Err(StorageError::Read {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "io failure"),
                })
            }
            fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let store = WatchlistStore::new(BrokenStorage);
        assert!(matches!(store.load(), Err(WatchlistError::Read(_))));
    }
}
