//! Frame payload caching.
//!
//! A keyed, time-bounded cache of fetched frame payloads with in-flight
//! fetch deduplication. Entries are invalidated explicitly by the sync path
//! after an acknowledged annotation write, and expire after a fixed
//! staleness window as a backstop against a missed invalidation. Both
//! mutation paths (navigation fetches, sync acknowledgments) only ever
//! replace whole entries.

use std::collections::{HashMap, HashSet};

use web_time::{Duration, Instant};

use crate::model::FramePayload;

/// Cache key: requested dimensions are part of identity because the server
/// downscales to fit them, so different bounds yield different payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub video: String,
    pub frame: i64,
    pub max_width: u32,
    pub max_height: u32,
}

impl FrameKey {
    /// Build a key for a frame at the given requested bounds.
    pub fn new(video: impl Into<String>, frame: i64, max_width: u32, max_height: u32) -> Self {
        Self {
            video: video.into(),
            frame,
            max_width,
            max_height,
        }
    }

    /// True if this key addresses the given (video, frame), at any bounds.
    pub fn matches(&self, video: &str, frame: i64) -> bool {
        self.video == video && self.frame == frame
    }
}

#[derive(Debug)]
struct CacheEntry {
    payload: FramePayload,
    fetched_at: Instant,
}

/// Keyed, time-bounded cache of frame payloads.
#[derive(Debug)]
pub struct FrameCache {
    entries: HashMap<FrameKey, CacheEntry>,
    /// Keys with a fetch currently in flight, to dedup concurrent requests.
    pending: HashSet<FrameKey>,
    staleness_window: Duration,
}

impl FrameCache {
    /// Create a cache with the given staleness window.
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashSet::new(),
            staleness_window,
        }
    }

    /// Fresh payload for a key, or nothing. An entry older than the
    /// staleness window is treated as absent.
    pub fn lookup(&self, key: &FrameKey, now: Instant) -> Option<&FramePayload> {
        let entry = self.entries.get(key)?;
        if now.duration_since(entry.fetched_at) > self.staleness_window {
            log::debug!("🖼️ Cache entry expired for frame {}", key.frame);
            return None;
        }
        Some(&entry.payload)
    }

    /// True if a fetch is already in flight for the key.
    pub fn is_pending(&self, key: &FrameKey) -> bool {
        self.pending.contains(key)
    }

    /// Register an in-flight fetch. Returns false (and does nothing) when
    /// one is already pending for the key.
    pub fn begin_fetch(&mut self, key: &FrameKey) -> bool {
        if self.pending.contains(key) {
            log::debug!("🖼️ Fetch already in flight for frame {}", key.frame);
            return false;
        }
        self.pending.insert(key.clone());
        true
    }

    /// Store a resolved payload, replacing any prior entry wholesale.
    pub fn insert(&mut self, key: FrameKey, payload: FramePayload, now: Instant) {
        self.pending.remove(&key);
        log::debug!("🖼️ Caching frame {} of {}", key.frame, key.video);
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                fetched_at: now,
            },
        );
    }

    /// Resolve an in-flight fetch that failed, leaving any prior entry
    /// untouched.
    pub fn fetch_failed(&mut self, key: &FrameKey) {
        self.pending.remove(key);
    }

    /// Drop every entry for (video, frame) regardless of requested bounds.
    /// Called after every acknowledged annotation write so the cached
    /// payload's annotation reconverges with the server.
    pub fn invalidate(&mut self, video: &str, frame: i64) {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.matches(video, frame));
        log::debug!(
            "🔄 Invalidated {} cache entries for frame {} of {}",
            before - self.entries.len(),
            frame,
            video
        );
    }

    /// Drop every entry for a video. Called after a segmentation request is
    /// accepted, so overlays reconverge as the server produces them.
    pub fn invalidate_video(&mut self, video: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.video != video);
        log::debug!(
            "🔄 Invalidated {} cache entries for {}",
            before - self.entries.len(),
            video
        );
    }

    /// Number of live entries (stale ones included until touched).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
