//! DashMap-backed cache table

use crate::metrics;
use crate::upstream::DetailRecord;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Cache table lifecycle errors
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("cache table has not been initialized")]
    NotInitialized,

    #[error("cache table is already initialized")]
    AlreadyInitialized,
}

/// A lookup key that is not an integer id
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid cache key {key:?}: expected an integer id")]
pub struct InvalidKeyError {
    pub key: String,
}

impl InvalidKeyError {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Concurrent id → record table
///
/// Created empty and uninitialized; [`CacheStore::initialize`] creates the
/// table exactly once. Reads against an uninitialized store see an empty
/// table. Share it behind an `Arc`: one writer (the population worker), any
/// number of readers.
#[derive(Debug, Default)]
pub struct CacheStore {
    table: OnceLock<DashMap<i64, DetailRecord>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the backing table
    pub fn initialize(&self) -> Result<(), StoreError> {
        let mut created = false;
        self.table.get_or_init(|| {
            created = true;
            DashMap::new()
        });

        if created {
            tracing::debug!("Cache table created");
            Ok(())
        } else {
            Err(StoreError::AlreadyInitialized)
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.table.get().is_some()
    }

    /// Insert `record` under `id` unless the id is already present.
    ///
    /// Returns `true` when the insert took effect. An existing entry is never
    /// touched.
    pub fn insert_if_absent(&self, id: i64, record: DetailRecord) -> Result<bool, StoreError> {
        let table = self.table.get().ok_or(StoreError::NotInitialized)?;

        let inserted = match table.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(record);
                true
            }
        };

        if inserted {
            metrics::set_cached_entries(table.len() as i64);
        }
        tracing::trace!(id, inserted, "cache: insert_if_absent");
        Ok(inserted)
    }

    /// Point read; absent means "not cached yet"
    pub fn lookup(&self, id: i64) -> Option<DetailRecord> {
        let found = self
            .table
            .get()
            .and_then(|table| table.get(&id).map(|entry| entry.value().clone()));

        if found.is_some() {
            metrics::record_cache_hit();
        } else {
            metrics::record_cache_miss();
        }
        found
    }

    /// Point read by string key, parsed as the integer id first
    pub fn lookup_key(&self, key: &str) -> Result<Option<DetailRecord>, InvalidKeyError> {
        let id = parse_key(key)?;
        Ok(self.lookup(id))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.table
            .get()
            .map(|table| table.contains_key(&id))
            .unwrap_or(false)
    }

    /// Snapshot of every entry, ordered by id
    pub fn all(&self) -> Vec<(i64, DetailRecord)> {
        let mut entries: Vec<(i64, DetailRecord)> = self
            .table
            .get()
            .map(|table| {
                table
                    .iter()
                    .map(|entry| (*entry.key(), entry.value().clone()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    pub fn count(&self) -> usize {
        self.table.get().map(|table| table.len()).unwrap_or(0)
    }

    /// Remove every entry. Test/reset hook, never called by population.
    pub fn clear(&self) {
        if let Some(table) = self.table.get() {
            table.clear();
            metrics::set_cached_entries(0);
            tracing::info!("Cache cleared");
        }
    }
}

/// Parse a lookup key into an id
pub fn parse_key(key: &str) -> Result<i64, InvalidKeyError> {
    key.trim()
        .parse::<i64>()
        .map_err(|_| InvalidKeyError::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn record(id: i64, name: &str) -> DetailRecord {
        DetailRecord::from_value(json!({"id": id, "name": name})).unwrap()
    }

    fn ready_store() -> CacheStore {
        let store = CacheStore::new();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_initialize_once() {
        let store = CacheStore::new();
        assert!(!store.is_initialized());
        assert_eq!(store.initialize(), Ok(()));
        assert_eq!(store.initialize(), Err(StoreError::AlreadyInitialized));
        assert!(store.is_initialized());
    }

    #[test]
    fn test_insert_before_initialize_fails() {
        let store = CacheStore::new();
        assert_eq!(
            store.insert_if_absent(1, record(1, "bulbasaur")),
            Err(StoreError::NotInitialized)
        );
        assert_eq!(store.count(), 0);
        assert!(store.lookup(1).is_none());
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let store = ready_store();
        let first = record(1, "bulbasaur");
        let second = record(1, "impostor");

        assert_eq!(store.insert_if_absent(1, first.clone()), Ok(true));
        assert_eq!(store.insert_if_absent(1, second), Ok(false));
        assert_eq!(store.lookup(1), Some(first));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_absent_before_present() {
        let store = ready_store();
        assert!(store.lookup(25).is_none());

        let pikachu = record(25, "pikachu");
        store.insert_if_absent(25, pikachu.clone()).unwrap();

        for _ in 0..3 {
            assert_eq!(store.lookup(25), Some(pikachu.clone()));
        }
    }

    #[test]
    fn test_string_keys() {
        let store = ready_store();
        store.insert_if_absent(25, record(25, "pikachu")).unwrap();

        assert_eq!(store.lookup_key("25").unwrap(), store.lookup(25));
        assert_eq!(store.lookup_key(" 25 ").unwrap(), store.lookup(25));
        assert_eq!(store.lookup_key("26").unwrap(), None);
        assert_eq!(store.lookup_key("abc"), Err(InvalidKeyError::new("abc")));
        assert!(store.lookup_key("").is_err());
        assert!(store.lookup_key("2.5").is_err());
    }

    #[test]
    fn test_first_writer_wins_under_concurrency() {
        let store = Arc::new(ready_store());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .insert_if_absent(7, record(7, &format!("writer-{}", i)))
                        .unwrap()
                })
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|inserted| *inserted)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(store.count(), 1);
        assert!(store.lookup(7).unwrap().name().unwrap().starts_with("writer-"));
    }

    #[test]
    fn test_all_is_sorted_and_clear_empties() {
        let store = ready_store();
        store.insert_if_absent(3, record(3, "venusaur")).unwrap();
        store.insert_if_absent(1, record(1, "bulbasaur")).unwrap();
        store.insert_if_absent(2, record(2, "ivysaur")).unwrap();

        let ids: Vec<i64> = store.all().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        store.clear();
        assert_eq!(store.count(), 0);
        assert!(!store.contains(1));
        // Table survives a clear
        assert_eq!(store.insert_if_absent(1, record(1, "bulbasaur")), Ok(true));
    }
}
