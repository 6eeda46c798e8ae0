//! Pointer-gesture annotation editing.
//!
//! Translates raw pointer events into normalized geometry updates on the
//! per-frame draft map. Three mutually exclusive drawing modes; the mode is
//! global (it applies to whichever frame is active), passed around as an
//! explicit enum so transitions are testable without a render surface.

use crate::error::AnnotatorError;
use crate::geometry::{BoundingBox, Point};
use crate::model::{Annotation, DraftAnnotations};

/// The active drawing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Drag out a bounding box
    #[default]
    Box,
    /// Click to add positive point prompts
    PositivePoint,
    /// Click to add negative point prompts
    NegativePoint,
}

impl DrawMode {
    /// Display name for the mode toggle.
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::Box => "Draw Boxes",
            DrawMode::PositivePoint => "Draw Positive Points",
            DrawMode::NegativePoint => "Draw Negative Points",
        }
    }

    /// All modes, in toggle order.
    pub fn all() -> &'static [DrawMode] {
        &[DrawMode::Box, DrawMode::PositivePoint, DrawMode::NegativePoint]
    }
}

/// In-progress drag state for box mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    /// A box drag is active, anchored at the pointer-down position.
    Drawing { anchor: Point },
}

/// A finalized edit, carrying the full current draft for its frame.
///
/// This is the command object handed to the sync path: each edit ships the
/// complete draft (never a delta), so out-of-order push completion cannot
/// corrupt final server state.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationChanged {
    pub annotation: Annotation,
}

/// Per-frame draft editing driven by pointer events.
#[derive(Debug)]
pub struct AnnotationEditor {
    mode: DrawMode,
    drag: DragState,
    drafts: DraftAnnotations,
    show_segmentation: bool,
}

impl AnnotationEditor {
    /// Create an editor for a video with empty drafts.
    pub fn new(video_name: impl Into<String>) -> Self {
        Self {
            mode: DrawMode::default(),
            drag: DragState::Idle,
            drafts: DraftAnnotations::new(video_name),
            show_segmentation: false,
        }
    }

    /// The active drawing mode.
    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Switch drawing mode, cancelling any in-progress drag.
    pub fn set_mode(&mut self, mode: DrawMode) {
        if self.drag != DragState::Idle {
            log::debug!("✏️ Mode change cancels active drag");
            self.drag = DragState::Idle;
        }
        self.mode = mode;
    }

    /// True while a box drag is active.
    pub fn is_drawing(&self) -> bool {
        self.drag != DragState::Idle
    }

    /// Whether the segmentation overlay is preferred as background. A view
    /// preference only; it never touches any annotation.
    pub fn show_segmentation(&self) -> bool {
        self.show_segmentation
    }

    /// Flip the overlay preference.
    pub fn toggle_segmentation(&mut self) {
        self.show_segmentation = !self.show_segmentation;
    }

    /// Current draft for a frame, if the frame has been visited or edited.
    pub fn draft(&self, frame_number: i64) -> Option<&Annotation> {
        self.drafts.get(frame_number)
    }

    /// Adopt a fetched server-side annotation unless a local draft exists.
    pub fn seed(&mut self, frame_number: i64, annotation: Annotation) {
        self.drafts.seed(frame_number, annotation);
    }

    /// Handle pointer-down at a pixel position on the active frame.
    ///
    /// Box mode records the drag anchor; point modes append a point and
    /// finalize immediately (no pointer-up needed).
    pub fn pointer_down(
        &mut self,
        frame_number: i64,
        px: f32,
        py: f32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Option<AnnotationChanged>, AnnotatorError> {
        let pos = Point::from_pixels(px, py, surface_width, surface_height)?;
        match self.mode {
            DrawMode::Box => {
                self.drag = DragState::Drawing { anchor: pos };
                Ok(None)
            }
            DrawMode::PositivePoint => {
                let draft = self.drafts.get_or_insert(frame_number);
                draft.push_positive(pos);
                log::debug!("✏️ Positive point on frame {}", frame_number);
                Ok(Some(AnnotationChanged {
                    annotation: draft.clone(),
                }))
            }
            DrawMode::NegativePoint => {
                let draft = self.drafts.get_or_insert(frame_number);
                draft.push_negative(pos);
                log::debug!("✏️ Negative point on frame {}", frame_number);
                Ok(Some(AnnotationChanged {
                    annotation: draft.clone(),
                }))
            }
        }
    }

    /// Handle pointer movement. While a box drag is active, recompute the
    /// box from anchor to the current position and update the draft.
    /// Returns true when the draft changed.
    pub fn pointer_move(
        &mut self,
        frame_number: i64,
        px: f32,
        py: f32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<bool, AnnotatorError> {
        let DragState::Drawing { anchor } = self.drag else {
            return Ok(false);
        };
        let pos = Point::from_pixels(px, py, surface_width, surface_height)?;
        let draft = self.drafts.get_or_insert(frame_number);
        draft.set_box(BoundingBox::from_drag(anchor, pos));
        Ok(true)
    }

    /// Handle pointer-up. Finalizes an active box drag: the draft box is
    /// canonicalized and the full draft is emitted for the sync path.
    pub fn pointer_up(&mut self, frame_number: i64) -> Option<AnnotationChanged> {
        if self.drag == DragState::Idle {
            return None;
        }
        self.drag = DragState::Idle;
        let draft = self.drafts.get_or_insert(frame_number);
        draft.canonicalize_box();
        log::debug!("✏️ Box finalized on frame {}", frame_number);
        Some(AnnotationChanged {
            annotation: draft.clone(),
        })
    }

    /// Reset the frame's draft to the empty shape and emit it.
    pub fn clear(&mut self, frame_number: i64) -> AnnotationChanged {
        let draft = self.drafts.get_or_insert(frame_number);
        draft.clear();
        log::debug!("✏️ Cleared frame {}", frame_number);
        AnnotationChanged {
            annotation: draft.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn editor() -> AnnotationEditor {
        AnnotationEditor::new("clip.mp4")
    }

    #[test]
    fn test_box_drag_gesture() {
        let mut ed = editor();
        assert!(ed.pointer_down(0, 100.0, 50.0, 800, 600).unwrap().is_none());
        assert!(ed.is_drawing());

        assert!(ed.pointer_move(0, 300.0, 200.0, 800, 600).unwrap());
        let b = *ed.draft(0).unwrap().bounding_box().unwrap();
        assert!((b.width - 0.25).abs() < EPS);
        assert!((b.height - 0.25).abs() < EPS);

        let changed = ed.pointer_up(0).unwrap();
        assert!(!ed.is_drawing());
        let b = *changed.annotation.bounding_box().unwrap();
        assert!((b.x - 0.125).abs() < EPS);
        assert!((b.y - 0.0833).abs() < 1e-3);
    }

    #[test]
    fn test_backwards_drag_is_canonicalized_on_up() {
        let mut ed = editor();
        ed.pointer_down(0, 300.0, 200.0, 800, 600).unwrap();
        ed.pointer_move(0, 100.0, 50.0, 800, 600).unwrap();

        // Mid-drag the extents are signed.
        let mid = *ed.draft(0).unwrap().bounding_box().unwrap();
        assert!(mid.width < 0.0 && mid.height < 0.0);

        let b = *ed.pointer_up(0).unwrap().annotation.bounding_box().unwrap();
        assert!(b.width > 0.0 && b.height > 0.0);
        assert!((b.x - 0.125).abs() < EPS);
    }

    #[test]
    fn test_point_modes_finalize_on_down() {
        let mut ed = editor();
        ed.set_mode(DrawMode::PositivePoint);
        let changed = ed.pointer_down(2, 400.0, 300.0, 800, 600).unwrap().unwrap();
        assert_eq!(changed.annotation.positive_points().len(), 1);

        ed.set_mode(DrawMode::NegativePoint);
        let changed = ed.pointer_down(2, 40.0, 30.0, 800, 600).unwrap().unwrap();
        assert_eq!(changed.annotation.negative_points().len(), 1);
        assert_eq!(changed.annotation.positive_points().len(), 1);
    }

    #[test]
    fn test_pointer_move_without_drag_is_noop() {
        let mut ed = editor();
        assert!(!ed.pointer_move(0, 10.0, 10.0, 800, 600).unwrap());
        assert!(ed.draft(0).is_none());
        assert!(ed.pointer_up(0).is_none());
    }

    #[test]
    fn test_zero_surface_is_rejected() {
        let mut ed = editor();
        assert!(matches!(
            ed.pointer_down(0, 10.0, 10.0, 0, 600),
            Err(AnnotatorError::InvalidDimension { .. })
        ));
        assert!(!ed.is_drawing());
    }

    #[test]
    fn test_mode_toggle_labels_and_order() {
        let labels: Vec<&str> = DrawMode::all().iter().map(|m| m.name()).collect();
        assert_eq!(
            labels,
            ["Draw Boxes", "Draw Positive Points", "Draw Negative Points"]
        );
        assert_eq!(DrawMode::all()[0], DrawMode::default());
    }

    #[test]
    fn test_mode_change_cancels_drag() {
        let mut ed = editor();
        ed.pointer_down(0, 10.0, 10.0, 800, 600).unwrap();
        ed.set_mode(DrawMode::PositivePoint);
        assert!(!ed.is_drawing());
        assert!(ed.pointer_up(0).is_none());
    }

    #[test]
    fn test_clear_then_points_counts() {
        let mut ed = editor();
        ed.pointer_down(0, 100.0, 50.0, 800, 600).unwrap();
        ed.pointer_move(0, 300.0, 200.0, 800, 600).unwrap();
        ed.pointer_up(0);

        let cleared = ed.clear(0);
        assert!(cleared.annotation.is_empty());

        ed.set_mode(DrawMode::PositivePoint);
        ed.pointer_down(0, 10.0, 10.0, 800, 600).unwrap();
        ed.pointer_down(0, 20.0, 20.0, 800, 600).unwrap();
        ed.set_mode(DrawMode::NegativePoint);
        ed.pointer_down(0, 30.0, 30.0, 800, 600).unwrap();

        let draft = ed.draft(0).unwrap();
        assert_eq!(
            draft.positive_points().len() + draft.negative_points().len(),
            3
        );
        assert!(draft.bounding_box().is_none());
    }

    #[test]
    fn test_overlay_toggle_does_not_touch_drafts() {
        let mut ed = editor();
        ed.set_mode(DrawMode::PositivePoint);
        ed.pointer_down(0, 10.0, 10.0, 800, 600).unwrap();
        let before = ed.draft(0).cloned();

        assert!(!ed.show_segmentation());
        ed.toggle_segmentation();
        assert!(ed.show_segmentation());
        assert_eq!(ed.draft(0).cloned(), before);
    }

    #[test]
    fn test_seed_respects_existing_draft() {
        let mut ed = editor();
        ed.set_mode(DrawMode::PositivePoint);
        ed.pointer_down(1, 10.0, 10.0, 800, 600).unwrap();

        let server = Annotation::empty("clip.mp4", 1);
        ed.seed(1, server);
        assert_eq!(ed.draft(1).unwrap().positive_points().len(), 1);
    }
}
