//! Bounded verdict cache keyed by `(raw title, language)`.
//!
//! Verdicts only depend on the corpus, so the cache is cleared wholesale on
//! every index mutation rather than tracking which entries a write touches.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::Verdict;

pub const DEFAULT_RESULT_CACHE_CAPACITY: usize = 5_000;

pub struct ResultCache {
    inner: Mutex<LruCache<(String, String), Verdict>>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(1).expect("1 is non-zero"));
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, title: &str, language: &str) -> Option<Verdict> {
        let mut cache = self.inner.lock().ok()?;
        cache
            .get(&(title.to_string(), language.to_string()))
            .cloned()
    }

    pub fn insert(&self, title: &str, language: &str, verdict: Verdict) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put((title.to_string(), language.to_string()), verdict);
        }
    }

    /// Drop every cached verdict. Called after any index mutation.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_CACHE_CAPACITY)
    }
}
