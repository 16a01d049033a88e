//! A read-through cache of database records keyed by ID.
//!
//! Handlers that write a record must invalidate its entry after the write succeeds.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex},
};

/// The number of records a cache holds unless told otherwise.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A shared map from record ID to the last record loaded from the database.
///
/// Holds at most `capacity` records. Loading a new record into a full cache
/// evicts an arbitrary entry first.
#[derive(Debug, Clone)]
pub struct RecordCache<K, V> {
    entries: Arc<Mutex<HashMap<K, V>>>,
    capacity: usize,
}

impl<K, V> Default for RecordCache<K, V> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<K, V> RecordCache<K, V> {
    /// Create an empty cache that holds at most `capacity` records, and at least one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }
}

impl<K, V> RecordCache<K, V>
where
    K: Eq + Hash + Copy + std::fmt::Debug,
    V: Clone,
{
    /// Get the record for `key`, calling `load` on a cache miss.
    ///
    /// Errors from `load` are returned as is and nothing is cached.
    /// If the cache lock is poisoned the record is loaded without caching.
    pub fn get_or_load<E>(&self, key: K, load: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(error) => {
                tracing::error!("could not acquire record cache lock: {error}");
                return load();
            }
        };

        if let Some(value) = entries.get(&key) {
            tracing::debug!("record cache hit for {key:?}");
            return Ok(value.clone());
        }

        let value = load()?;

        if entries.len() >= self.capacity {
            let evicted = entries.keys().next().copied();

            if let Some(evicted) = evicted {
                tracing::debug!("record cache full, evicting {evicted:?}");
                entries.remove(&evicted);
            }
        }

        entries.insert(key, value.clone());

        Ok(value)
    }

    /// Remove the record for `key`.
    pub fn invalidate(&self, key: K) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.remove(&key);
            }
            Err(error) => {
                tracing::error!("could not invalidate record cache entry {key:?}: {error}");
            }
        }
    }

    #[cfg(test)]
    pub fn contains(&self, key: K) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(&key))
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod record_cache_tests {
    use std::cell::Cell;

    use super::RecordCache;

    #[test]
    fn loads_once_then_hits() {
        let cache: RecordCache<i64, String> = RecordCache::default();
        let loads = Cell::new(0);
        let load = || {
            loads.set(loads.get() + 1);
            Ok::<_, ()>("fee".to_owned())
        };

        assert_eq!(cache.get_or_load(1, load), Ok("fee".to_owned()));
        assert_eq!(cache.get_or_load(1, load), Ok("fee".to_owned()));

        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache: RecordCache<i64, i32> = RecordCache::default();
        cache.get_or_load(1, || Ok::<_, ()>(1)).unwrap();

        cache.invalidate(1);

        assert!(!cache.contains(1));
        assert_eq!(cache.get_or_load(1, || Ok::<_, ()>(2)), Ok(2));
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: RecordCache<i64, i32> = RecordCache::default();

        assert_eq!(cache.get_or_load(1, || Err("missing")), Err("missing"));

        assert!(!cache.contains(1));
    }

    #[test]
    fn full_cache_evicts_before_loading() {
        let cache: RecordCache<i64, i64> = RecordCache::with_capacity(2);

        for key in 1..=3 {
            cache.get_or_load(key, || Ok::<_, ()>(key)).unwrap();
        }

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(3));
        assert_eq!(cache.get_or_load(3, || Ok::<_, ()>(-1)), Ok(3));
    }

    #[test]
    fn zero_capacity_still_caches_one_record() {
        let cache: RecordCache<i64, i64> = RecordCache::with_capacity(0);

        cache.get_or_load(1, || Ok::<_, ()>(1)).unwrap();

        assert!(cache.contains(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let cache: RecordCache<i64, i32> = RecordCache::default();
        let clone = cache.clone();

        clone.get_or_load(7, || Ok::<_, ()>(7)).unwrap();

        assert!(cache.contains(7));
    }
}
