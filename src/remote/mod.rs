//! Remote store contract.
//!
//! The transport is an external collaborator; the core only sees these
//! abstract operations. [`memory::MemoryStore`] is the in-crate
//! implementation used by the demo binary and the scenario tests.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;
use crate::model::{Annotation, FramePayload};

pub use memory::MemoryStore;

/// One entry of the video listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub name: String,
    pub size_bytes: u64,
}

/// Available videos with their byte sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoListing {
    pub videos: Vec<VideoInfo>,
}

/// Operations the annotation core consumes from the remote store.
pub trait FrameStore {
    /// Fetch one frame, downscaled by the server to fit the requested
    /// bounds while preserving aspect ratio. The payload reports the actual
    /// rendered width/height.
    fn fetch_frame(
        &mut self,
        video: &str,
        frame: i64,
        max_width: u32,
        max_height: u32,
    ) -> Result<FramePayload, AnnotatorError>;

    /// Replace the stored annotation for (video, frame). Whole-object
    /// write, last-write-wins, no partial-update semantics.
    fn put_annotation(&mut self, annotation: &Annotation) -> Result<(), AnnotatorError>;

    /// Request a segmentation run over `start..=end` anchored at `frame`.
    /// Asynchronous server-side: completion is observed only by later
    /// refetches growing a segmented image.
    fn request_segmentation(
        &mut self,
        video: &str,
        frame: i64,
        start: i64,
        end: i64,
    ) -> Result<(), AnnotatorError>;

    /// List available videos.
    fn list_videos(&mut self) -> Result<VideoListing, AnnotatorError>;

    /// Health probe for the reachability indicator.
    fn liveness(&mut self) -> bool;
}
