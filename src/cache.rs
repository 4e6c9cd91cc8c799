//! Response Cache
//!
//! In-memory TTL cache for tag-generation payloads, keyed by the
//! normalized request parameters. Repeated identical requests within
//! the TTL are served without re-invoking the provider.
//!
//! This is a latency optimization, not a durability mechanism: losing
//! the cache on restart only causes a cold-cache hit. Entries carry no
//! size bound beyond natural request diversity since they are small and
//! TTL-bounded. Concurrent misses on the same key may both call the
//! provider; duplicate upstream calls are acceptable.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::constants::cache as cache_constants;
use crate::tags::{TagRequest, TagResponse};

/// Cache entry with creation time for lazy TTL eviction
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: TagResponse,
    created_at: Instant,
}

/// Concurrent TTL cache for tag responses
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(cache_constants::TTL_SECS))
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up a cached payload; expired entries behave as absent and
    /// are evicted on the spot.
    pub fn get(&self, key: &str) -> Option<TagResponse> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                debug!(key, "cache hit");
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!(key, "cache entry expired, evicting");
            self.entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: String, payload: TagResponse) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                created_at: Instant::now(),
            },
        );
    }

    /// Number of live and expired entries currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derive the deterministic cache key for a request.
///
/// Topic is lowercased and whitespace-trimmed so trivially different
/// spellings of the same request share an entry. Existing tags are
/// deliberately excluded: they only filter output and would fragment
/// the key space.
pub fn request_key(request: &TagRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.topic.trim().to_lowercase().as_bytes());
    hasher.update([0u8]);
    hasher.update(request.intent.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(request.persona.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update([u8::from(request.stage)]);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{Intent, Persona, Stage};

    fn request(topic: &str, stage: Stage) -> TagRequest {
        TagRequest {
            topic: topic.to_string(),
            intent: Intent::Learn,
            persona: Persona::Student,
            stage,
            existing_tags: vec![],
        }
    }

    fn payload() -> TagResponse {
        TagResponse::fallback(vec!["Think Step By Step".to_string()], "test")
    }

    #[test]
    fn test_get_put_round_trip() {
        let cache = ResponseCache::default();
        let key = request_key(&request("Photosynthesis", Stage::Initial));

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), payload());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn test_expired_entry_behaves_as_absent() {
        let cache = ResponseCache::new(Duration::from_millis(1));
        let key = "k".to_string();
        cache.put(key.clone(), payload());

        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get(&key).is_none());
        // Evicted lazily on the failed read
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_normalizes_topic() {
        let a = request_key(&request("  Photosynthesis ", Stage::Initial));
        let b = request_key(&request("photosynthesis", Stage::Initial));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_varies_by_stage() {
        let a = request_key(&request("Photosynthesis", Stage::Initial));
        let b = request_key(&request("Photosynthesis", Stage::FollowUp));
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_ignores_existing_tags() {
        let mut with_tags = request("Photosynthesis", Stage::Initial);
        with_tags.existing_tags = vec!["Think Step By Step".to_string()];
        assert_eq!(
            request_key(&with_tags),
            request_key(&request("Photosynthesis", Stage::Initial))
        );
    }
}
