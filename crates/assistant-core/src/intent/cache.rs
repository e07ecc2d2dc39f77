use std::hash::Hasher;
use std::time::{Duration, Instant};

use fnv::FnvHasher;
use moka::sync::Cache;

use crate::intent::resolution::IntentPayload;
use crate::settings::{CacheSettings, MAX_CACHE_TTL_SECS};

/// A stored resolution and when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedIntent {
    pub matched: bool,
    pub payload: IntentPayload,
    pub inserted_at: Instant,
}

/// Resolution cache keyed by a stable hash of the utterance.
///
/// Entries expire after the TTL and are dropped lazily when looked up;
/// nothing sweeps the cache in the background.
#[derive(Debug, Clone)]
pub struct IntentCache {
    cache: Cache<u64, CachedIntent>,
    ttl: Duration,
}

impl IntentCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let max_ttl = Duration::from_secs(MAX_CACHE_TTL_SECS);
        let ttl = if ttl > max_ttl {
            tracing::warn!(
                ttl_secs = ttl.as_secs(),
                max_secs = MAX_CACHE_TTL_SECS,
                "cache ttl too large; clamping"
            );
            max_ttl
        } else {
            ttl
        };
        let max_capacity = if max_capacity == 0 { 1 } else { max_capacity };
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.ttl(), settings.max_capacity)
    }

    /// Stable across processes, unlike the std hasher.
    pub fn key_for(utterance: &str) -> u64 {
        let mut hasher = FnvHasher::default();
        hasher.write(utterance.trim().as_bytes());
        hasher.finish()
    }

    pub fn get(&self, utterance: &str) -> Option<CachedIntent> {
        let key = Self::key_for(utterance);
        let entry = self.cache.get(&key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            self.cache.invalidate(&key);
            return None;
        }
        Some(entry)
    }

    pub fn insert(&self, utterance: &str, matched: bool, payload: IntentPayload) {
        self.cache.insert(
            Self::key_for(utterance),
            CachedIntent {
                matched,
                payload,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of live entries.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Affect;

    fn chat() -> IntentPayload {
        IntentPayload::Conversation {
            affect: Affect::Neutral,
        }
    }

    #[test]
    fn key_ignores_surrounding_whitespace() {
        assert_eq!(IntentCache::key_for("台北天氣"), IntentCache::key_for("  台北天氣\n"));
        assert_ne!(IntentCache::key_for("台北天氣"), IntentCache::key_for("東京天氣"));
    }

    #[test]
    fn returns_fresh_entries() {
        let cache = IntentCache::new(Duration::from_secs(300), 16);
        cache.insert("hello", false, chat());

        let entry = cache.get("hello").expect("entry");
        assert!(!entry.matched);
        assert_eq!(entry.payload, chat());
    }

    #[test]
    fn huge_ttl_is_clamped() {
        let cache = IntentCache::new(Duration::from_secs(99_999_999_999), 16);
        assert_eq!(cache.ttl(), Duration::from_secs(MAX_CACHE_TTL_SECS));

        cache.insert("hello", false, chat());
        assert!(cache.get("hello").is_some());
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = IntentCache::new(Duration::from_millis(50), 16);
        cache.insert("hello", false, chat());
        std::thread::sleep(Duration::from_millis(120));

        assert!(cache.get("hello").is_none());
    }

    #[test]
    fn clear_empties_cache() {
        let cache = IntentCache::new(Duration::from_secs(300), 16);
        cache.insert("one", false, chat());
        cache.insert("two", false, chat());

        cache.clear();

        assert!(cache.get("one").is_none());
        assert!(cache.get("two").is_none());
    }

    #[test]
    fn evicts_on_capacity() {
        let cache = IntentCache::new(Duration::from_secs(300), 2);
        cache.insert("one", false, chat());
        cache.insert("two", false, chat());
        cache.insert("three", false, chat());

        assert!(cache.len() <= 2);
    }
}
