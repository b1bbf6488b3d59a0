use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Thread-safe LRU cache for text embeddings.
///
/// Reranking splits repeat candidate passages across samples; caching by text
/// value avoids re-embedding the duplicates. Bounded by LRU eviction.
pub struct EmbeddingCache {
    entries: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` embeddings (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("Cache capacity must be at least 1");
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Look up the embedding for a text, refreshing its LRU position.
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.entries.lock().unwrap().get(text).cloned()
    }

    /// Store an embedding under its source text.
    pub fn put(&self, text: String, embedding: Vec<f32>) {
        self.entries.lock().unwrap().put(text, embedding);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}
