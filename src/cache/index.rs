//! Tag index: the consumed invalidation seam plus an in-memory
//! implementation tracking tag <-> entry dependencies both ways.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use metrics::counter;
use tracing::{debug, warn};

use super::CacheError;
use super::store::{CachedEntry, EntryStore};
use super::tags::CacheTag;

const DEFAULT_CAPACITY: usize = 512;

/// Host-provided invalidation cache, as consumed by this core.
pub trait CacheTagIndex: Send + Sync {
    /// Evict every entry that declared a dependency on `tag`. Flushing a
    /// tag nothing depends on is a successful no-op; an unreachable
    /// backend is an error, never swallowed.
    fn flush_by_tag(&self, tag: &CacheTag) -> Result<(), CacheError>;
}

struct Inner {
    entries: EntryStore,
    tag_to_entries: HashMap<String, HashSet<String>>,
    entry_to_tags: HashMap<String, HashSet<String>>,
}

/// In-memory tag index with bounded entry storage.
pub struct MemoryTagIndex {
    inner: RwLock<Inner>,
}

impl MemoryTagIndex {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped above zero");
        Self {
            inner: RwLock::new(Inner {
                entries: EntryStore::new(capacity),
                tag_to_entries: HashMap::new(),
                entry_to_tags: HashMap::new(),
            }),
        }
    }

    /// Store an entry together with the tags it depends on.
    pub fn put(&self, key: impl Into<String>, entry: CachedEntry, tags: &[CacheTag]) {
        let key = key.into();
        let mut inner = write_lock(&self.inner, "put");

        if let Some(evicted) = inner.entries.put(key.clone(), entry) {
            unregister(&mut inner, &evicted);
        }

        // Re-tagging an existing key replaces its registrations.
        unregister_tags_only(&mut inner, &key);
        let tag_set: HashSet<String> = tags.iter().map(|tag| tag.as_str().to_string()).collect();
        for tag in &tag_set {
            inner
                .tag_to_entries
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        inner.entry_to_tags.insert(key, tag_set);
    }

    pub fn get(&self, key: &str) -> Option<CachedEntry> {
        write_lock(&self.inner, "get").entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        read_lock(&self.inner, "contains").entries.contains(key)
    }

    pub fn len(&self) -> usize {
        read_lock(&self.inner, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryTagIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheTagIndex for MemoryTagIndex {
    fn flush_by_tag(&self, tag: &CacheTag) -> Result<(), CacheError> {
        let mut inner = write_lock(&self.inner, "flush_by_tag");
        counter!("foglio_cache_flush_total").increment(1);

        let Some(keys) = inner.tag_to_entries.remove(tag.as_str()) else {
            debug!(tag = tag.as_str(), "flush for unknown tag is a no-op");
            return Ok(());
        };

        let mut flushed = 0u64;
        for key in keys {
            if inner.entries.remove(&key) {
                flushed += 1;
            }
            // Drop the key from every other tag it was registered under.
            if let Some(tags) = inner.entry_to_tags.remove(&key) {
                for other in tags {
                    if other == tag.as_str() {
                        continue;
                    }
                    if let Some(set) = inner.tag_to_entries.get_mut(&other) {
                        set.remove(&key);
                        if set.is_empty() {
                            inner.tag_to_entries.remove(&other);
                        }
                    }
                }
            }
        }

        counter!("foglio_cache_flushed_entries_total").increment(flushed);
        debug!(tag = tag.as_str(), flushed, "flushed cache tag");
        Ok(())
    }
}

/// Remove an entry's registrations after LRU eviction.
fn unregister(inner: &mut Inner, key: &str) {
    if let Some(tags) = inner.entry_to_tags.remove(key) {
        for tag in tags {
            if let Some(set) = inner.tag_to_entries.get_mut(&tag) {
                set.remove(key);
                if set.is_empty() {
                    inner.tag_to_entries.remove(&tag);
                }
            }
        }
    }
}

fn unregister_tags_only(inner: &mut Inner, key: &str) {
    if inner.entry_to_tags.contains_key(key) {
        unregister(inner, key);
    }
}

fn read_lock<'a>(lock: &'a RwLock<Inner>, op: &'static str) -> RwLockReadGuard<'a, Inner> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                lock_kind = "rwlock.read",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}

fn write_lock<'a>(lock: &'a RwLock<Inner>, op: &'static str) -> RwLockWriteGuard<'a, Inner> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}
