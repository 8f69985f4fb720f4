//! Thumbnail caching layer

use crate::pipeline::{DocumentId, Page};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

struct CacheInner {
    lru: LruCache<DocumentId, Vec<Page>>,
    total_bytes: usize,
}

fn pages_size(pages: &[Page]) -> usize {
    pages.iter().map(Page::byte_size).sum()
}

/// Rendered pages per document, bounded by entry count and byte budget
pub struct ThumbnailCache {
    inner: Mutex<CacheInner>,
    max_bytes: usize,
}

impl ThumbnailCache {
    /// Create a cache holding at most `capacity` documents and `max_bytes`
    /// of encoded thumbnails
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store the pages of a document, replacing earlier ones.
    /// Sets larger than the whole budget are not kept.
    pub fn put(&self, document: DocumentId, pages: Vec<Page>) {
        let new_size = pages_size(&pages);
        let mut inner = self.inner.lock();

        if let Some(old) = inner.lru.pop(&document) {
            inner.total_bytes = inner.total_bytes.saturating_sub(pages_size(&old));
        }
        if new_size > self.max_bytes {
            return;
        }

        while inner.total_bytes + new_size > self.max_bytes {
            match inner.lru.pop_lru() {
                Some((_, evicted)) => {
                    inner.total_bytes = inner.total_bytes.saturating_sub(pages_size(&evicted));
                }
                None => break,
            }
        }

        // Count-based eviction inside `put` bypasses the byte tally
        if inner.lru.len() == inner.lru.cap().get() {
            if let Some((_, evicted)) = inner.lru.pop_lru() {
                inner.total_bytes = inner.total_bytes.saturating_sub(pages_size(&evicted));
            }
        }

        inner.total_bytes += new_size;
        inner.lru.put(document, pages);
    }

    pub fn get(&self, document: &DocumentId) -> Option<Vec<Page>> {
        self.inner.lock().lru.get(document).cloned()
    }

    pub fn contains(&self, document: &DocumentId) -> bool {
        self.inner.lock().lru.contains(document)
    }

    pub fn remove(&self, document: &DocumentId) -> Option<Vec<Page>> {
        let mut inner = self.inner.lock();
        let pages = inner.lru.pop(document)?;
        inner.total_bytes = inner.total_bytes.saturating_sub(pages_size(&pages));
        Some(pages)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.lru.clear();
        inner.total_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Encoded thumbnail bytes currently held
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }
}
