//! Push bookkeeping for annotation writes.
//!
//! Edits are fire-and-forget from the editor's perspective, but pushes are
//! held to at-most-one-in-flight per frame: an edit arriving while a push
//! is airborne marks the frame dirty instead of racing a second write, and
//! the acknowledgment triggers a follow-up push with the then-current full
//! draft. Each started push carries the complete draft (never a delta), so
//! last-write-wins holds at per-frame granularity.

use std::collections::HashSet;

/// What to do with an edit that wants to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDisposition {
    /// No push in flight for the frame: snapshot the draft and send it.
    Start,
    /// A push is airborne: the frame is now dirty, send nothing yet.
    Coalesced,
}

/// Follow-up work decided by a push completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushCompletion {
    /// Invalidate the frame's cache entries (successful ack only).
    pub invalidate: bool,
    /// Edits landed while the push was airborne: push the fresh draft.
    pub repush: bool,
}

/// Per-frame in-flight and dirty tracking for annotation pushes.
#[derive(Debug, Default)]
pub struct SyncController {
    in_flight: HashSet<(String, i64)>,
    dirty: HashSet<(String, i64)>,
}

impl SyncController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register intent to push the current draft for (video, frame).
    pub fn request_push(&mut self, video: &str, frame: i64) -> PushDisposition {
        let key = (video.to_string(), frame);
        if self.in_flight.contains(&key) {
            log::debug!("📤 Push for frame {frame} coalesced behind in-flight write");
            self.dirty.insert(key);
            PushDisposition::Coalesced
        } else {
            self.in_flight.insert(key);
            log::debug!("📤 Push started for frame {frame} of {video}");
            PushDisposition::Start
        }
    }

    /// Resolve a push. Failures keep the draft locally and are not retried;
    /// the discrepancy surfaces only if a later refetch shadows the unsent
    /// draft (accepted risk).
    pub fn complete(&mut self, video: &str, frame: i64, ok: bool) -> PushCompletion {
        let key = (video.to_string(), frame);
        self.in_flight.remove(&key);
        let was_dirty = self.dirty.remove(&key);
        if ok {
            PushCompletion {
                invalidate: true,
                repush: was_dirty,
            }
        } else {
            log::warn!("📤 Push failed for frame {frame} of {video}; draft kept locally");
            PushCompletion {
                invalidate: false,
                repush: false,
            }
        }
    }

    /// True if a push is airborne for the frame.
    pub fn is_in_flight(&self, video: &str, frame: i64) -> bool {
        self.in_flight.contains(&(video.to_string(), frame))
    }
}
