//! Least-recently-used cache with prefix invalidation

use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Counters describing cache effectiveness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries currently stored
    pub entries: usize,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    last_used: u64,
}

/// Bounded key/value cache that evicts the least recently used entry
///
/// Both [`get`](Self::get) and [`set`](Self::set) count as a use.
/// [`peek`](Self::peek) reads without touching recency or statistics.
///
/// # Example
///
/// ```rust
/// use pr_cache::LruCache;
///
/// let mut cache = LruCache::new(2);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get("a");
/// cache.set("c", 3); // evicts "b"
///
/// assert!(cache.peek("b").is_none());
/// assert_eq!(cache.get("a"), Some(&1));
/// ```
#[derive(Debug, Clone)]
pub struct LruCache<V> {
    entries: HashMap<String, Entry<V>>,
    capacity: usize,
    tick: u64,
    stats: CacheStats,
}

impl<V> LruCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value and mark it most recently used
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let tick = self.next_tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = tick;
                self.stats.hits += 1;
                Some(&entry.value)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Look up a value without changing recency or statistics
    pub fn peek(&self, key: &str) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value, evicting the least recently used entry
    /// when a new key would exceed capacity
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let last_used = self.next_tick();
        self.entries.insert(key, Entry { value, last_used });
    }

    /// Remove a single entry
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Remove every entry whose key starts with `prefix`
    ///
    /// Returns the number of removed entries.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        self.retain_keys(|key| !key.starts_with(prefix))
    }

    /// Remove every entry under `prefix` except `keep`
    ///
    /// Used to drop results for superseded commits while keeping the
    /// current one.
    pub fn invalidate_prefix_except(&mut self, prefix: &str, keep: &str) -> usize {
        self.retain_keys(|key| key == keep || !key.starts_with(prefix))
    }

    /// Drop all entries (statistics are kept)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Snapshot of hit/miss/eviction counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            debug!("Evicting least recently used cache entry '{}'", key);
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }

    fn retain_keys(&mut self, keep: impl Fn(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(key));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Invalidated {} cache entries", removed);
        }
        removed
    }
}
