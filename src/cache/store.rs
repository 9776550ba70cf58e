//! Bounded entry storage backing the in-memory tag index.

use std::num::NonZeroUsize;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;

/// A cached render body with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub content_type: String,
    pub body: Bytes,
}

impl CachedEntry {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// LRU-bounded entry map. Eviction is reported back to the caller so tag
/// registrations can be cleaned up alongside.
pub(crate) struct EntryStore {
    entries: LruCache<String, CachedEntry>,
}

impl EntryStore {
    pub(crate) fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> Option<CachedEntry> {
        let entry = self.entries.get(key).cloned();
        if entry.is_some() {
            counter!("foglio_cache_hit_total").increment(1);
        } else {
            counter!("foglio_cache_miss_total").increment(1);
        }
        entry
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Insert an entry; returns the key evicted to make room, if any.
    pub(crate) fn put(&mut self, key: String, entry: CachedEntry) -> Option<String> {
        let inserted = key.clone();
        match self.entries.push(key, entry) {
            Some((evicted, _)) if evicted != inserted => {
                counter!("foglio_cache_evict_total").increment(1);
                Some(evicted)
            }
            _ => None,
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
