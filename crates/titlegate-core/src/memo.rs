//! Bounded memoization for the pure text transforms.
//!
//! Normalization, phonetic hashing, and trigram extraction are all pure and
//! called many times per request over a recurring vocabulary. Each transform
//! keeps its own size-bounded table; eviction is LRU.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Capacity shared by the text-transform tables.
pub const TRANSFORM_MEMO_CAPACITY: usize = 200_000;

/// A thread-safe, size-bounded memo table keyed by the input string.
pub struct MemoCache<V: Clone> {
    inner: Mutex<LruCache<String, V>>,
}

impl<V: Clone> MemoCache<V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(1).expect("1 is non-zero"));
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs outside the lock, so a slow transform never blocks
    /// other lookups.
    pub fn get_or_insert_with(&self, key: &str, compute: impl FnOnce() -> V) -> V {
        if let Ok(mut cache) = self.inner.lock() {
            if let Some(hit) = cache.get(key) {
                return hit.clone();
            }
        }

        let value = compute();

        if let Ok(mut cache) = self.inner.lock() {
            cache.put(key.to_string(), value.clone());
        }
        value
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn computes_once_per_key() {
        let cache: MemoCache<String> = MemoCache::new(16);
        let calls = AtomicUsize::new(0);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "value".to_string()
        };

        assert_eq!(cache.get_or_insert_with("k", compute), "value");
        assert_eq!(cache.get_or_insert_with("k", compute), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache: MemoCache<usize> = MemoCache::new(2);
        cache.get_or_insert_with("a", || 1);
        cache.get_or_insert_with("b", || 2);
        cache.get_or_insert_with("c", || 3);
        assert_eq!(cache.len(), 2);

        // "a" was evicted, so the compute runs again.
        let recomputed = cache.get_or_insert_with("a", || 10);
        assert_eq!(recomputed, 10);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let cache: MemoCache<usize> = MemoCache::new(0);
        assert_eq!(cache.get_or_insert_with("a", || 1), 1);
        assert_eq!(cache.len(), 1);
    }
}
