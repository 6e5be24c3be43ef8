use crate::cache::CacheStats;
use crate::keyspace::ChunkKey;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Key-value store ordered by last access.
///
/// Backed by a doubly-linked hash map: insert, lookup and promotion are O(1).
/// The least recently used entry sits at the head and is the one
/// [`evict_oldest`](Self::evict_oldest) removes. With a capacity set, `put`
/// evicts from the head automatically.
pub struct RecencyStore<V> {
    inner: LruCache<ChunkKey, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> RecencyStore<V> {
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    pub fn with_capacity(capacity: Option<NonZeroUsize>) -> Self {
        let inner = match capacity {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            inner,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Insert or overwrite; the entry becomes the most recently used.
    pub fn put(&mut self, key: ChunkKey, value: V) {
        if let Some((evicted, _)) = self.inner.push(key.clone(), value) {
            if evicted != key {
                self.evictions += 1;
                tracing::debug!("Evicted chunk {} to make room for {}", evicted, key);
            }
        }
    }

    /// Look up and promote to most recently used. Misses have no side effect
    /// besides the miss counter.
    pub fn get(&mut self, key: &ChunkKey) -> Option<&V> {
        match self.inner.get(key) {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up without touching recency order or counters.
    pub fn peek(&self, key: &ChunkKey) -> Option<&V> {
        self.inner.peek(key)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.inner.contains(key)
    }

    pub fn remove(&mut self, key: &ChunkKey) -> Option<V> {
        self.inner.pop(key)
    }

    /// Remove and return the least recently used entry.
    pub fn evict_oldest(&mut self) -> Option<(ChunkKey, V)> {
        let evicted = self.inner.pop_lru();
        if evicted.is_some() {
            self.evictions += 1;
        }
        evicted
    }

    pub fn oldest_key(&self) -> Option<&ChunkKey> {
        self.inner.peek_lru().map(|(key, _)| key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<&ChunkKey> {
        self.inner.iter().rev().map(|(key, _)| key).collect()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entry_count: self.inner.len(),
        }
    }
}

impl<V> Default for RecencyStore<V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ChunkKey {
        s.to_string()
    }

    #[test]
    fn test_get_promotes_entry() {
        let mut store = RecencyStore::unbounded();
        store.put(key("a"), 1);
        store.put(key("b"), 2);
        store.put(key("c"), 3);

        assert_eq!(store.get(&key("a")), Some(&1));
        assert_eq!(store.oldest_key(), Some(&key("b")));
        assert_eq!(store.keys(), vec![&key("b"), &key("c"), &key("a")]);
    }

    #[test]
    fn test_missing_key_has_no_side_effects() {
        let mut store = RecencyStore::unbounded();
        store.put(key("a"), 1);
        store.put(key("b"), 2);

        assert_eq!(store.get(&key("zzz")), None);
        assert_eq!(store.keys(), vec![&key("a"), &key("b")]);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_overwrite_moves_to_tail() {
        let mut store = RecencyStore::unbounded();
        store.put(key("a"), 1);
        store.put(key("b"), 2);
        store.put(key("a"), 10);

        assert_eq!(store.len(), 2);
        assert_eq!(store.peek(&key("a")), Some(&10));
        assert_eq!(store.oldest_key(), Some(&key("b")));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_evict_oldest() {
        let mut store = RecencyStore::unbounded();
        store.put(key("a"), 1);
        store.put(key("b"), 2);

        assert_eq!(store.evict_oldest(), Some((key("a"), 1)));
        assert_eq!(store.evict_oldest(), Some((key("b"), 2)));
        assert_eq!(store.evict_oldest(), None);
        assert_eq!(store.stats().evictions, 2);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let mut store = RecencyStore::with_capacity(NonZeroUsize::new(2));
        store.put(key("a"), 1);
        store.put(key("b"), 2);
        store.get(&key("a"));
        store.put(key("c"), 3);

        assert!(store.contains(&key("a")));
        assert!(!store.contains(&key("b")));
        assert!(store.contains(&key("c")));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_clear_resets_entries() {
        let mut store = RecencyStore::unbounded();
        store.put(key("a"), 1);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.oldest_key(), None);
        assert_eq!(store.evict_oldest(), None);
    }
}
