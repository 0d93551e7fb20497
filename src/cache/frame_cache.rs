use crate::cache::fingerprint::FrameFingerprint;
use crate::effects::config::Resolution;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{AnimatorError, AnimatorResult};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// A composited frame held by the cache. Never mutated after insertion.
#[derive(Clone, Debug)]
pub struct CachedFrame {
    /// Key the frame was stored under.
    pub fingerprint: FrameFingerprint,
    /// Shared pixels.
    pub frame: Arc<FrameRGBA>,
    /// Size class the frame was composited for.
    pub resolution: Resolution,
}

/// Capacity bounds; whichever is hit first triggers LRU eviction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheLimits {
    /// Maximum number of frames.
    pub max_entries: usize,
    /// Maximum total pixel bytes.
    pub max_bytes: usize,
}

impl CacheLimits {
    /// Defaults sized for 960x540 preview frames.
    pub const PREVIEW: Self = Self {
        max_entries: 240,
        max_bytes: 512 * 1024 * 1024,
    };
    /// Defaults sized for 1920x1080 export frames.
    pub const EXPORT: Self = Self {
        max_entries: 32,
        max_bytes: 512 * 1024 * 1024,
    };
}

/// Counters since construction (or the last [`FrameCache::clear`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a frame.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Frames stored.
    pub inserts: u64,
    /// Frames dropped to respect the limits.
    pub evictions: u64,
    /// Pixel bytes currently held.
    pub bytes: usize,
}

struct Inner {
    map: LruCache<FrameFingerprint, CachedFrame>,
    stats: CacheStats,
}

/// Bounded LRU of composited frames, safe to share between jobs.
///
/// Each call takes the lock for one lookup or insert only.
pub struct FrameCache {
    inner: Mutex<Inner>,
    limits: CacheLimits,
}

impl std::fmt::Debug for FrameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCache")
            .field("limits", &self.limits)
            .field("stats", &self.stats())
            .finish()
    }
}

impl FrameCache {
    /// Create an empty cache.
    pub fn new(limits: CacheLimits) -> AnimatorResult<Self> {
        let cap = NonZeroUsize::new(limits.max_entries)
            .ok_or_else(|| AnimatorError::invalid_config("frame cache needs max_entries > 0"))?;
        if limits.max_bytes == 0 {
            return Err(AnimatorError::invalid_config(
                "frame cache needs max_bytes > 0",
            ));
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                map: LruCache::new(cap),
                stats: CacheStats::default(),
            }),
            limits,
        })
    }

    /// Configured limits.
    pub fn limits(&self) -> CacheLimits {
        self.limits
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are immutable once inserted, so a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a frame and mark it most recently used.
    pub fn get(&self, fingerprint: &FrameFingerprint) -> Option<CachedFrame> {
        let mut inner = self.lock();
        match inner.map.get(fingerprint).cloned() {
            Some(hit) => {
                inner.stats.hits += 1;
                tracing::debug!(%fingerprint, "frame cache hit");
                Some(hit)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store a frame. If the key is already present the existing entry wins and is returned.
    ///
    /// Frames larger than the byte budget are returned without being stored.
    pub fn put(
        &self,
        fingerprint: FrameFingerprint,
        frame: Arc<FrameRGBA>,
        resolution: Resolution,
    ) -> CachedFrame {
        let mut inner = self.lock();
        if let Some(existing) = inner.map.get(&fingerprint) {
            return existing.clone();
        }

        let entry = CachedFrame {
            fingerprint,
            frame,
            resolution,
        };
        let size = entry.frame.byte_len();
        if size > self.limits.max_bytes {
            tracing::debug!(%fingerprint, size, "frame exceeds cache budget, not stored");
            return entry;
        }

        while inner.stats.bytes + size > self.limits.max_bytes {
            let Some((_, evicted)) = inner.map.pop_lru() else {
                break;
            };
            inner.stats.bytes -= evicted.frame.byte_len();
            inner.stats.evictions += 1;
        }
        if let Some((_, evicted)) = inner.map.push(fingerprint, entry.clone()) {
            inner.stats.bytes -= evicted.frame.byte_len();
            inner.stats.evictions += 1;
        }
        inner.stats.bytes += size;
        inner.stats.inserts += 1;
        entry
    }

    /// `true` if the key is present; does not touch recency or counters.
    pub fn contains(&self, fingerprint: &FrameFingerprint) -> bool {
        self.lock().map.contains(fingerprint)
    }

    /// Number of frames held.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// `true` when no frames are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Drop every frame and reset counters.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.stats = CacheStats::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frame_cache.rs"]
mod tests;
