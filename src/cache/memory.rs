//! In-process LRU tile storage bounded by total bytes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use super::TileCache;
use crate::error::Result;

/// Default capacity of a memory cache built from configuration
pub const DEFAULT_CAPACITY_BYTES: usize = 64 * 1024 * 1024;

struct CacheEntry {
    data: Arc<Vec<u8>>,
    size_bytes: usize,
}

struct LruState {
    current_bytes: usize,
    capacity_bytes: usize,
    entries: LruCache<String, CacheEntry>,
}

impl LruState {
    fn insert(&mut self, key: String, data: Arc<Vec<u8>>) {
        let size_bytes = data.len();
        if let Some(old) = self.entries.pop(&key) {
            self.current_bytes = self.current_bytes.saturating_sub(old.size_bytes);
        }
        if size_bytes > self.capacity_bytes {
            debug!(key = %key, size_bytes, "tile larger than memory cache, not stored");
            return;
        }

        while self.current_bytes + size_bytes > self.capacity_bytes {
            if let Some((evicted, entry)) = self.entries.pop_lru() {
                debug!(key = %evicted, "evicted tile");
                self.current_bytes = self.current_bytes.saturating_sub(entry.size_bytes);
            } else {
                break;
            }
        }

        self.current_bytes = self.current_bytes.saturating_add(size_bytes);
        self.entries.put(key, CacheEntry { data, size_bytes });
    }
}

/// Least-recently-used cache holding at most `capacity_bytes` of tile data.
///
/// Entries larger than the whole capacity are never stored.
pub struct MemoryCache {
    state: Mutex<LruState>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            state: Mutex::new(LruState {
                current_bytes: 0,
                capacity_bytes,
                entries: LruCache::unbounded(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bytes currently held
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.lock().current_bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_BYTES)
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (entries, current_bytes, capacity_bytes) = {
            let state = self.lock();
            (state.entries.len(), state.current_bytes, state.capacity_bytes)
        };
        f.debug_struct("MemoryCache")
            .field("entries", &entries)
            .field("current_bytes", &current_bytes)
            .field("capacity_bytes", &capacity_bytes)
            .finish()
    }
}

impl TileCache for MemoryCache {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.lock().entries.contains(key))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let hit = self.lock().entries.get(key).map(|e| Arc::clone(&e.data));
        if hit.is_none() {
            debug!(key, "tile cache miss");
        }
        Ok(hit.map(|data| data.as_ref().clone()))
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        self.lock().insert(key.to_string(), Arc::new(data.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.lock();
        if let Some(old) = state.entries.pop(key) {
            state.current_bytes = state.current_bytes.saturating_sub(old.size_bytes);
        }
        Ok(())
    }
}
