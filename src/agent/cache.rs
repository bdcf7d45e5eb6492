use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Thread-safe bounded LRU memo for idempotent agent decisions
///
/// Uses the Arc<Mutex<>> pattern for safe concurrent access across tasks.
/// Keys are stable hashes of the exact input text, so identical inputs hit
/// the cache and everything else misses.
#[derive(Clone)]
pub struct DecisionCache<V: Clone> {
    cache: Arc<Mutex<LruCache<String, V>>>,
}

impl<V: Clone> DecisionCache<V> {
    /// Create a cache holding at most `capacity` entries (LRU eviction).
    ///
    /// # Panics
    /// Panics if capacity is 0
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(NonZeroUsize::new(capacity).expect("Capacity must be non-zero"));
        Self {
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn get(&self, text: &str) -> Option<V> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(&Self::generate_key(text)).cloned()
    }

    pub fn put(&self, text: &str, value: V) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(Self::generate_key(text), value);
    }

    /// Stable hash key for an input text.
    fn generate_key(text: &str) -> String {
        let mut hasher = DefaultHasher::new();
        text.as_bytes().hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}
