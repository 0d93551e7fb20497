//! Memoized composited frames keyed by fingerprint.

/// Stable frame fingerprints.
pub mod fingerprint;
/// Bounded LRU store of composited frames.
pub mod frame_cache;

pub use fingerprint::{FrameFingerprint, fingerprint_frame};
pub use frame_cache::{CacheLimits, CacheStats, CachedFrame, FrameCache};
