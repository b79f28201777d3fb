//! Identity-keyed cache of rendered paragraph lines
//!
//! Keys are paragraph identities, not contents: a hit means the *same*
//! paragraph instance is still reachable from the current document, which is
//! exactly the invalidation the persistent model needs. Touched paragraphs
//! are fresh allocations and miss; untouched ones hit.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::document::ParaRef;
use crate::layout::engine::LayoutError;
use crate::layout::item::Line;

/// Cache capacity granularity
pub const CACHE_CHUNK_SIZE: usize = 32;

/// Round a capacity up to a whole number of chunks, at least one
pub fn chunked_capacity(n: usize) -> usize {
    (n.max(1) + CACHE_CHUNK_SIZE - 1) & !(CACHE_CHUNK_SIZE - 1)
}

/// Identity of a paragraph instance
///
/// Sound as a key only while the paragraph allocation is alive; entries
/// therefore keep their `ParaRef` pinned alongside the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParaKey(usize);

impl ParaKey {
    pub fn of(para: &ParaRef) -> Self {
        Self(Arc::as_ptr(para) as usize)
    }
}

struct CacheEntry {
    /// Pins the keyed allocation for the lifetime of the entry
    para: ParaRef,
    lines: Arc<Vec<Line>>,
}

/// LRU cache of rendered lines, keyed by paragraph identity
pub struct LruCache {
    entries: FxHashMap<ParaKey, CacheEntry>,
    /// Recency order, front = most recently used
    order: VecDeque<ParaKey>,
    capacity: usize,
}

impl LruCache {
    /// Create a cache; the capacity is rounded up to a whole chunk
    pub fn new(capacity: usize) -> Result<Self, LayoutError> {
        if capacity == 0 {
            return Err(LayoutError::InvalidCacheCapacity);
        }
        Ok(Self {
            entries: FxHashMap::default(),
            order: VecDeque::new(),
            capacity: chunked_capacity(capacity),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up the lines for a paragraph instance, marking it recently used
    pub fn get(&mut self, para: &ParaRef) -> Option<Arc<Vec<Line>>> {
        let key = ParaKey::of(para);
        let lines = self.entries.get(&key).map(|entry| entry.lines.clone())?;
        self.touch(key);
        Some(lines)
    }

    /// Store the rendered lines for a paragraph instance
    pub fn insert(&mut self, para: ParaRef, lines: Arc<Vec<Line>>) {
        let key = ParaKey::of(&para);
        let fresh = self
            .entries
            .insert(key, CacheEntry { para, lines })
            .is_none();
        if fresh {
            self.order.push_front(key);
        } else {
            self.touch(key);
        }
        self.evict_over_capacity();
    }

    /// Change the capacity, evicting least-recently-used entries if needed
    ///
    /// The new capacity is rounded up to a whole chunk.
    pub fn resize(&mut self, capacity: usize) {
        self.capacity = chunked_capacity(capacity);
        self.evict_over_capacity();
    }

    /// Drop every entry
    pub fn purge(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Move a key to the front of the recency order
    fn touch(&mut self, key: ParaKey) {
        self.order.retain(|k| *k != key);
        self.order.push_front(key);
    }

    fn evict_over_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            match self.order.pop_back() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }
}
