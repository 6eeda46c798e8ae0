//! Frame navigation.
//!
//! Holds the current frame index and computes prefetch targets. Indices are
//! unclamped signed integers: an out-of-range frame is the server's error
//! to signal, not the navigator's.

/// Current frame position with next/prev/seek navigation.
#[derive(Debug, Default)]
pub struct FrameNavigator {
    current: i64,
}

impl FrameNavigator {
    /// Start at frame 0.
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// The active frame index.
    pub fn current(&self) -> i64 {
        self.current
    }

    /// Advance one frame and return the new index.
    pub fn next(&mut self) -> i64 {
        self.current += 1;
        log::debug!("▶ Frame {}", self.current);
        self.current
    }

    /// Step back one frame and return the new index. Backward paging gets
    /// no prefetch; it is assumed infrequent.
    pub fn prev(&mut self) -> i64 {
        self.current -= 1;
        log::debug!("◀ Frame {}", self.current);
        self.current
    }

    /// Jump directly to an arbitrary frame.
    pub fn seek(&mut self, target: i64) -> i64 {
        self.current = target;
        log::debug!("⏩ Seek to frame {}", self.current);
        self.current
    }

    /// Frame to prefetch when the "next" affordance is hovered.
    pub fn hover_target(&self) -> i64 {
        self.current + 1
    }

    /// Frame to prefetch shortly after a forward step, so rapid forward
    /// paging never pays unmitigated fetch latency twice in a row.
    pub fn lookahead_target(&self) -> i64 {
        self.current + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_then_prev_restores_index() {
        let mut nav = FrameNavigator::new();
        nav.seek(10);
        nav.next();
        nav.prev();
        assert_eq!(nav.current(), 10);
    }

    #[test]
    fn test_seek_then_step() {
        let mut nav = FrameNavigator::new();
        nav.seek(5);
        assert_eq!(nav.next(), 6);

        nav.seek(5);
        assert_eq!(nav.prev(), 4);
    }

    #[test]
    fn test_negative_indices_are_not_clamped() {
        let mut nav = FrameNavigator::new();
        assert_eq!(nav.prev(), -1);
        nav.seek(-42);
        assert_eq!(nav.current(), -42);
    }

    #[test]
    fn test_prefetch_targets() {
        let mut nav = FrameNavigator::new();
        nav.seek(7);
        assert_eq!(nav.hover_target(), 8);
        assert_eq!(nav.lookahead_target(), 9);
    }
}
