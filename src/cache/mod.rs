use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::Rng;

use crate::configs::CacheConfig;
use crate::track::ResolvedStream;

struct CacheSlot {
    stream: ResolvedStream,
    expires_at: Instant,
    last_access: Instant,
}

/// Time- and capacity-bounded store mapping a track's canonical source
/// reference to its previously resolved stream.
///
/// Shared across all sessions to amortize redundant resolution. Lookups
/// of expired entries behave as misses and drop the entry; inserting
/// past capacity evicts the least recently accessed entry. Neither path
/// ever reports an error — absence is modelled as a miss.
pub struct ResolutionCache {
    inner: Mutex<HashMap<String, CacheSlot>>,
    capacity: usize,
    ttl: Duration,
}

impl ResolutionCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, Duration::from_secs(config.ttl_secs))
    }

    /// Returns the cached stream for `source_ref`, refreshing its access
    /// time. An expired entry is removed and reported as a miss.
    pub fn get(&self, source_ref: &str) -> Option<ResolvedStream> {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        match inner.get_mut(source_ref) {
            Some(slot) if now < slot.expires_at => {
                slot.last_access = now;
                Some(slot.stream.clone())
            }
            Some(_) => {
                inner.remove(source_ref);
                None
            }
            None => None,
        }
    }

    /// Stores a resolved stream under `source_ref`. May silently evict
    /// the least recently accessed entry when the cache is full; an
    /// existing entry for the same key is superseded in place.
    pub fn put(&self, source_ref: &str, stream: ResolvedStream) {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        inner.retain(|_, slot| now < slot.expires_at);

        if !inner.contains_key(source_ref) && inner.len() >= self.capacity {
            let evictee = inner
                .iter()
                .min_by_key(|(_, slot)| slot.last_access)
                .map(|(key, _)| key.clone());
            if let Some(key) = evictee {
                tracing::debug!("Resolution cache full, evicting: {}", key);
                inner.remove(&key);
            }
        }

        inner.insert(
            source_ref.to_string(),
            CacheSlot {
                stream,
                expires_at: now + self.ttl,
                last_access: now,
            },
        );
    }

    /// Picks a live entry uniformly at random, for fallback playback
    /// when a session's queue is exhausted. Does not count as an access.
    pub fn random_entry(&self) -> Option<(String, ResolvedStream)> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        inner.retain(|_, slot| now < slot.expires_at);

        if inner.is_empty() {
            return None;
        }

        let index = rand::thread_rng().gen_range(0..inner.len());
        inner
            .iter()
            .nth(index)
            .map(|(key, slot)| (key.clone(), slot.stream.clone()))
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        inner.retain(|_, slot| now < slot.expires_at);
        inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(url: &str) -> ResolvedStream {
        ResolvedStream {
            stream_url: url.to_string(),
            title: format!("title of {}", url),
            thumbnail: None,
            duration: Some(Duration::from_secs(180)),
            resolved_at: Instant::now(),
        }
    }

    #[test]
    fn hit_before_ttl_miss_after() {
        let cache = ResolutionCache::new(10, Duration::from_millis(50));
        cache.put("a", stream("https://cdn/a"));

        assert!(cache.get("a").is_some());
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn overflow_evicts_exactly_the_least_recently_accessed() {
        let cache = ResolutionCache::new(3, Duration::from_secs(60));
        cache.put("a", stream("https://cdn/a"));
        std::thread::sleep(Duration::from_millis(5));
        cache.put("b", stream("https://cdn/b"));
        std::thread::sleep(Duration::from_millis(5));
        cache.put("c", stream("https://cdn/c"));
        std::thread::sleep(Duration::from_millis(5));

        // Touch "a" so "b" becomes the oldest access.
        assert!(cache.get("a").is_some());
        std::thread::sleep(Duration::from_millis(5));

        cache.put("d", stream("https://cdn/d"));

        assert_eq!(cache.len(), 3);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
        assert!(cache.get("d").is_some());
    }

    #[test]
    fn reinserting_existing_key_supersedes_without_eviction() {
        let cache = ResolutionCache::new(2, Duration::from_secs(60));
        cache.put("a", stream("https://cdn/a1"));
        cache.put("b", stream("https://cdn/b"));
        cache.put("a", stream("https://cdn/a2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().stream_url, "https://cdn/a2");
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn random_entry_only_sees_live_entries() {
        let cache = ResolutionCache::new(10, Duration::from_millis(40));
        assert!(cache.random_entry().is_none());

        cache.put("a", stream("https://cdn/a"));
        let (key, picked) = cache.random_entry().expect("one live entry");
        assert_eq!(key, "a");
        assert_eq!(picked.stream_url, "https://cdn/a");

        std::thread::sleep(Duration::from_millis(50));
        assert!(cache.random_entry().is_none());
    }
}
