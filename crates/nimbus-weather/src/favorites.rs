//! Persisted favorites list.
//!
//! The list lives in a single named slot of a key-value store, encoded as a
//! JSON array of strings and rewritten wholesale after every mutation.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Slot holding the favorites array.
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
    #[error("Corrupt value under {key}: {message}")]
    Corrupt { key: String, message: String },
}

/// String key-value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Key-value store backed by one JSON object file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write of the file within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            key: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        let map = self.read_map()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        let write_err = |message: String| StoreError::Write {
            path: self.path.display().to_string(),
            message,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(&map).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| write_err(e.to_string()))
    }
}

/// In-process store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Result of [`FavoritesStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Deduplicated, ordered list of city labels.
///
/// Duplicates are detected by exact, case-sensitive string comparison.
pub struct FavoritesStore {
    backend: Arc<dyn KeyValueStore>,
    items: Vec<String>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Load from the backend. `seed` is used only when the slot has never
    /// been written; a stored empty list stays empty.
    pub fn load(backend: Arc<dyn KeyValueStore>, seed: &[String]) -> Result<Self, StoreError> {
        let items = match backend.get(FAVORITES_KEY)? {
            Some(raw) => {
                let parsed: Option<Vec<String>> =
                    serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                        key: FAVORITES_KEY.to_string(),
                        message: e.to_string(),
                    })?;
                // A stored `null` behaves like an absent slot
                parsed.unwrap_or_else(|| seed.to_vec())
            }
            None => seed.to_vec(),
        };

        Ok(Self {
            backend,
            items: dedup_preserving_order(items),
        })
    }

    pub fn list(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, label: &str) -> bool {
        self.items.iter().any(|f| f == label)
    }

    /// Append `label` unless present. The in-memory list only changes once
    /// the write succeeded.
    pub fn add(&mut self, label: &str) -> Result<AddOutcome, StoreError> {
        if self.contains(label) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        let mut next = self.items.clone();
        next.push(label.to_string());
        self.persist(&next)?;
        self.items = next;
        tracing::info!("Added {} to favorites", label);
        Ok(AddOutcome::Added)
    }

    /// Drop every entry equal to `label`. Returns whether anything changed;
    /// the list is persisted either way and kept unchanged if that fails.
    pub fn remove(&mut self, label: &str) -> Result<bool, StoreError> {
        let next: Vec<String> = self
            .items
            .iter()
            .filter(|f| f.as_str() != label)
            .cloned()
            .collect();
        self.persist(&next)?;
        let removed = next.len() != self.items.len();
        self.items = next;
        if removed {
            tracing::info!("Removed {} from favorites", label);
        }
        Ok(removed)
    }

    fn persist(&self, items: &[String]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(items).map_err(|e| StoreError::Write {
            path: FAVORITES_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.backend.set(FAVORITES_KEY, &encoded)
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::default())
    }

    fn seed() -> Vec<String> {
        vec!["Dubai".to_string(), "London".to_string()]
    }

    #[test]
    fn test_add_twice_keeps_one() {
        let backend = memory();
        let mut store = FavoritesStore::load(backend.clone(), &[]).unwrap();

        assert_eq!(store.add("Paris, FR").unwrap(), AddOutcome::Added);
        assert_eq!(store.add("Paris, FR").unwrap(), AddOutcome::AlreadyPresent);

        assert_eq!(store.list(), ["Paris, FR"]);
        assert_eq!(
            backend.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["Paris, FR"]"#)
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut store = FavoritesStore::load(memory(), &[]).unwrap();
        store.add("paris, FR").unwrap();
        store.add("Paris, FR").unwrap();
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = FavoritesStore::load(memory(), &seed()).unwrap();
        assert!(!store.remove("Tokyo").unwrap());
        assert_eq!(store.list(), seed().as_slice());
    }

    #[test]
    fn test_seed_only_when_slot_absent() {
        let backend = memory();
        let store = FavoritesStore::load(backend.clone(), &seed()).unwrap();
        assert_eq!(store.list(), seed().as_slice());

        backend.set(FAVORITES_KEY, "[]").unwrap();
        let store = FavoritesStore::load(backend, &seed()).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_corrupt_slot_is_reported() {
        let backend = memory();
        backend.set(FAVORITES_KEY, "{not json").unwrap();
        let err = FavoritesStore::load(backend, &seed()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");
        let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&path));

        let mut store = FavoritesStore::load(backend.clone(), &[]).unwrap();
        store.add("Cairo, EG").unwrap();
        store.add("Lima, PE").unwrap();
        store.remove("Cairo, EG").unwrap();

        let reloaded = FavoritesStore::load(Arc::new(JsonFileStore::new(&path)), &seed()).unwrap();
        assert_eq!(reloaded.list(), ["Lima, PE"]);

        backend.set("other", "kept").unwrap();
        assert_eq!(backend.get("other").unwrap().as_deref(), Some("kept"));
        assert_eq!(
            backend.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["Lima, PE"]"#)
        );
    }

    /// Reads succeed, every write fails.
    struct ReadOnlyStore {
        slots: MemoryStore,
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.slots.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: "storage.json".to_string(),
                message: "read-only file system".to_string(),
            })
        }
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let slots = MemoryStore::default();
        slots.set(FAVORITES_KEY, r#"["Dubai"]"#).unwrap();
        let mut store = FavoritesStore::load(Arc::new(ReadOnlyStore { slots }), &[]).unwrap();

        assert!(matches!(store.add("Paris, FR"), Err(StoreError::Write { .. })));
        assert_eq!(store.list(), ["Dubai"]);
        // A retry tries the write again instead of claiming success
        assert!(store.add("Paris, FR").is_err());

        assert!(store.remove("Dubai").is_err());
        assert_eq!(store.list(), ["Dubai"]);
    }

    #[test]
    fn test_malformed_storage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{\"favorites\": [").unwrap();

        let err = JsonFileStore::new(&path).get(FAVORITES_KEY).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }), "got {:?}", err);
    }
}
