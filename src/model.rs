//! Persisted annotation state and server payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

/// The unit of persisted state per (video, frame).
///
/// Identity fields are fixed at construction; only the box and point
/// sequences mutate. Points are append-only within a session except on an
/// explicit [`Annotation::clear`]. Wire format is camelCase to match the
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    video_name: String,
    frame_number: i64,
    #[serde(rename = "box")]
    bounding_box: Option<BoundingBox>,
    #[serde(default)]
    positive_points: Vec<Point>,
    #[serde(default)]
    negative_points: Vec<Point>,
}

impl Annotation {
    /// Create an empty annotation for a frame.
    pub fn empty(video_name: impl Into<String>, frame_number: i64) -> Self {
        Self {
            video_name: video_name.into(),
            frame_number,
            bounding_box: None,
            positive_points: Vec::new(),
            negative_points: Vec::new(),
        }
    }

    /// The video this annotation belongs to.
    pub fn video_name(&self) -> &str {
        &self.video_name
    }

    /// The frame this annotation belongs to.
    pub fn frame_number(&self) -> i64 {
        self.frame_number
    }

    /// The box prompt, if one has been drawn.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Positive point prompts, in insertion order.
    pub fn positive_points(&self) -> &[Point] {
        &self.positive_points
    }

    /// Negative point prompts, in insertion order.
    pub fn negative_points(&self) -> &[Point] {
        &self.negative_points
    }

    /// Replace the box prompt (signed extents allowed mid-drag).
    pub fn set_box(&mut self, bounding_box: BoundingBox) {
        self.bounding_box = Some(bounding_box);
    }

    /// Canonicalize the box prompt in place, if present.
    pub fn canonicalize_box(&mut self) {
        if let Some(b) = self.bounding_box.as_mut() {
            *b = b.canonical();
        }
    }

    /// Append a positive point prompt.
    pub fn push_positive(&mut self, point: Point) {
        self.positive_points.push(point);
    }

    /// Append a negative point prompt.
    pub fn push_negative(&mut self, point: Point) {
        self.negative_points.push(point);
    }

    /// Reset to the empty shape, keeping identity.
    pub fn clear(&mut self) {
        self.bounding_box = None;
        self.positive_points.clear();
        self.negative_points.clear();
    }

    /// True when there is no box and no points.
    pub fn is_empty(&self) -> bool {
        self.bounding_box.is_none()
            && self.positive_points.is_empty()
            && self.negative_points.is_empty()
    }
}

/// Server-delivered view of one frame.
///
/// `image` and `segmented_image` are base64-encoded by the store; this core
/// never decodes them. `segmented_image` is present only once a
/// segmentation run has covered the frame. Wire format is snake_case to
/// match the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePayload {
    pub frame_number: i64,
    pub image: String,
    #[serde(default)]
    pub segmented_image: Option<String>,
    /// Absent until the first annotation write for this frame.
    #[serde(default)]
    pub annotation: Option<Annotation>,
    pub width: u32,
    pub height: u32,
}

impl FramePayload {
    /// The server-side annotation, normalized to an empty shape when the
    /// frame has never been annotated.
    pub fn annotation_or_empty(&self, video_name: &str) -> Annotation {
        self.annotation
            .clone()
            .unwrap_or_else(|| Annotation::empty(video_name, self.frame_number))
    }
}

/// The client's best-known annotation state per frame of one video,
/// independent of cache freshness.
///
/// Exists so in-progress edits survive navigating away from a frame and
/// back. Reset wholesale when the selected video changes.
#[derive(Debug, Default)]
pub struct DraftAnnotations {
    video_name: String,
    drafts: HashMap<i64, Annotation>,
}

impl DraftAnnotations {
    /// Create an empty draft map for a video.
    pub fn new(video_name: impl Into<String>) -> Self {
        Self {
            video_name: video_name.into(),
            drafts: HashMap::new(),
        }
    }

    /// The video these drafts belong to.
    pub fn video_name(&self) -> &str {
        &self.video_name
    }

    /// Current draft for a frame, if any.
    pub fn get(&self, frame_number: i64) -> Option<&Annotation> {
        self.drafts.get(&frame_number)
    }

    /// Mutable draft for a frame, created empty on first visit.
    pub fn get_or_insert(&mut self, frame_number: i64) -> &mut Annotation {
        self.drafts
            .entry(frame_number)
            .or_insert_with(|| Annotation::empty(self.video_name.clone(), frame_number))
    }

    /// Adopt a server-side annotation unless a local draft already exists.
    /// Local edits win over refetches within a session.
    pub fn seed(&mut self, frame_number: i64, annotation: Annotation) {
        self.drafts.entry(frame_number).or_insert(annotation);
    }
}
