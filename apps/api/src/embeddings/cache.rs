//! Bounded, expiring embedding cache keyed by content hash.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lru::LruCache;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

type ContentHash = [u8; 32];

struct Entry {
    vector: Arc<Vec<f32>>,
    stored_at: Instant,
}

/// LRU cache of embedding vectors. Entries older than `ttl` count as misses
/// and are dropped on access. Shared across requests through `AppState`.
pub struct EmbeddingCache {
    entries: Mutex<LruCache<ContentHash, Entry>>,
    ttl: Duration,
}

impl EmbeddingCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn key(text: &str) -> ContentHash {
        let mut key = [0u8; 32];
        key.copy_from_slice(&Sha256::digest(text.as_bytes()));
        key
    }

    pub fn get(&self, text: &str) -> Option<Arc<Vec<f32>>> {
        let key = Self::key(text);
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let expired = match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(Arc::clone(&entry.vector))
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(&key);
        }
        None
    }

    pub fn insert(&self, text: &str, vector: Arc<Vec<f32>>) {
        let entry = Entry {
            vector,
            stored_at: Instant::now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .put(Self::key(text), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(v: f32) -> Arc<Vec<f32>> {
        Arc::new(vec![v, v])
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_returns_stored_vector() {
        let cache = EmbeddingCache::new(8, Duration::from_secs(60));
        cache.insert("rust engineer", vector(1.0));
        assert_eq!(cache.get("rust engineer").as_deref(), Some(&vec![1.0, 1.0]));
        assert!(cache.get("Rust engineer").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_a_miss_and_evicted() {
        let cache = EmbeddingCache::new(8, Duration::from_secs(60));
        cache.insert("text", vector(1.0));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get("text").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = EmbeddingCache::new(2, Duration::from_secs(60));
        cache.insert("a", vector(1.0));
        cache.insert("b", vector(2.0));
        // touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c", vector(3.0));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_capacity_is_clamped_to_one() {
        let cache = EmbeddingCache::new(0, Duration::from_secs(60));
        cache.insert("a", vector(1.0));
        assert_eq!(cache.len(), 1);
    }
}
