//! In-memory place-detail cache.
//!
//! A plain map guarded by an `RwLock`: concurrent readers never block each
//! other, and writes replace whole records. Entries optionally expire after a
//! fixed lifetime; there is no size bound and no other eviction.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tastemap_core::PlaceRecord;

#[derive(Debug, Clone)]
struct Entry {
    record: PlaceRecord,
    stored_at: Instant,
}

/// Shared uid → [`PlaceRecord`] cache. Cloning shares the same storage.
#[derive(Debug, Clone, Default)]
pub struct PlaceCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Option<Duration>,
}

impl PlaceCache {
    /// A cache whose entries live until invalidated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose entries expire `ttl` after they were stored.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::default(),
            ttl: Some(ttl),
        }
    }

    /// Builds a cache from a TTL in seconds, `0` meaning no expiry.
    #[must_use]
    pub fn from_ttl_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::new()
        } else {
            Self::with_ttl(Duration::from_secs(secs))
        }
    }

    /// Returns the cached record, or `None` on a miss or an expired entry.
    #[must_use]
    pub fn get(&self, uid: &str) -> Option<PlaceRecord> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(uid)?;
        if self.is_expired(entry) {
            return None;
        }
        Some(entry.record.clone())
    }

    /// Stores `record` under `uid`, replacing any previous entry. Expired
    /// entries are swept out on the way in.
    pub fn put(&self, uid: impl Into<String>, record: PlaceRecord) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.ttl.is_some() {
            entries.retain(|_, entry| !self.is_expired(entry));
        }
        entries.insert(
            uid.into(),
            Entry {
                record,
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes `uid`. Returns whether an entry was present.
    pub fn invalidate(&self, uid: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(uid).is_some()
    }

    /// Number of stored entries, expired ones included until the next `put`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_returns_record() {
        let cache = PlaceCache::new();
        cache.put("a", PlaceRecord::new("a", "Alpha"));
        assert_eq!(cache.get("a").map(|r| r.name), Some("Alpha".to_string()));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn put_overwrites_rather_than_merges() {
        let cache = PlaceCache::new();
        let mut first = PlaceRecord::new("a", "Alpha");
        first.telephone = Some("123".into());
        cache.put("a", first);
        cache.put("a", PlaceRecord::new("a", "Alpha v2"));

        let stored = cache.get("a").unwrap();
        assert_eq!(stored.name, "Alpha v2");
        assert!(stored.telephone.is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = PlaceCache::new();
        cache.put("a", PlaceRecord::new("a", "Alpha"));
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_entries_expire_immediately() {
        let cache = PlaceCache::with_ttl(Duration::ZERO);
        cache.put("a", PlaceRecord::new("a", "Alpha"));
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_sweeps_expired_entries() {
        let cache = PlaceCache::with_ttl(Duration::from_millis(20));
        cache.put("stale", PlaceRecord::new("stale", "Stale"));
        std::thread::sleep(Duration::from_millis(40));

        cache.put("fresh", PlaceRecord::new("fresh", "Fresh"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("stale").is_none());
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn from_ttl_secs_zero_means_no_expiry() {
        let cache = PlaceCache::from_ttl_secs(0);
        cache.put("a", PlaceRecord::new("a", "Alpha"));
        cache.put("b", PlaceRecord::new("b", "Beta"));
        assert!(cache.get("a").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clones_share_storage() {
        let cache = PlaceCache::new();
        let other = cache.clone();
        other.put("a", PlaceRecord::new("a", "Alpha"));
        assert!(cache.get("a").is_some());
        assert!(cache.invalidate("a"));
        assert!(other.is_empty());
    }

    #[test]
    fn concurrent_readers_and_writers_do_not_corrupt_entries() {
        let cache = PlaceCache::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let uid = format!("u{}", i % 10);
                        cache.put(uid.clone(), PlaceRecord::new(uid.clone(), format!("t{t}")));
                        if let Some(r) = cache.get(&uid) {
                            assert_eq!(r.uid, uid);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread panicked");
        }
        assert_eq!(cache.len(), 10);
    }
}
