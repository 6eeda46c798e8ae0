//! Application messages and effects.
//!
//! Every event is a message applied atomically by
//! [`AnnotatorApp::update`](crate::app::AnnotatorApp::update); every I/O the
//! update decides on comes back as an [`Effect`] for the surrounding
//! runtime to execute. Fetch and push completions re-enter as messages, so
//! out-of-order completion is handled by identity checks at application
//! time, never by locking.

use web_time::Duration;

use crate::cache::FrameKey;
use crate::editor::DrawMode;
use crate::error::AnnotatorError;
use crate::model::{Annotation, FramePayload};

/// Messages that can be sent to update application state.
#[derive(Debug, Clone)]
pub enum Message {
    // Video selection
    /// A video was chosen from the listing
    VideoSelected(String),

    // Navigation
    /// Advance to the next frame
    NextFrame,
    /// Step back to the previous frame
    PrevFrame,
    /// Jump to an arbitrary frame (the "change frame" dialog)
    SeekFrame(i64),
    /// The "next" affordance was hovered or focused
    HoverNext,
    /// A scheduled look-ahead prefetch came due
    PrefetchDue(i64),

    // Pointer gestures on the canvas
    /// Pointer pressed at a surface pixel position
    PointerDown { x: f32, y: f32 },
    /// Pointer moved to a surface pixel position
    PointerMove { x: f32, y: f32 },
    /// Pointer released
    PointerUp,

    // Editing controls
    /// Drawing mode toggled
    ModeSelected(DrawMode),
    /// Segmentation overlay preference flipped
    ToggleOverlay,
    /// Reset the active frame's annotation to empty
    ClearFrame,
    /// Request a segmentation run over a frame range anchored at the
    /// active frame
    SegmentRange { start: i64, end: i64 },

    // Surface
    /// The render surface was resized
    SurfaceResized { width: u32, height: u32 },

    // Completions
    /// A frame fetch resolved
    FrameFetched {
        key: FrameKey,
        result: Result<FramePayload, AnnotatorError>,
        /// True when this was a look-ahead fetch; failures are swallowed
        prefetch: bool,
    },
    /// An annotation push resolved
    PushResolved {
        video: String,
        frame: i64,
        result: Result<(), AnnotatorError>,
    },
}

/// I/O the runtime must perform on the core's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch a frame the active view is waiting on
    FetchFrame(FrameKey),
    /// Fetch a frame ahead of need; the caller never waits on it
    PrefetchFrame(FrameKey),
    /// Fire a [`Message::PrefetchDue`] for the frame after the delay
    SchedulePrefetch { frame: i64, delay: Duration },
    /// Send the full current draft to the remote store
    PushAnnotation(Annotation),
    /// Ask the server for a segmentation run
    RequestSegmentation {
        video: String,
        frame: i64,
        start: i64,
        end: i64,
    },
}
