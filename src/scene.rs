//! Headless render model.
//!
//! Builds the full draw-command list for the active frame: background
//! choice, the stroked box, and the filled point prompts, all projected to
//! the current surface size. Every state change that affects the view
//! (background, draft, frame number, overlay toggle) rebuilds the scene
//! from scratch; there is no partial redraw.

use crate::error::AnnotatorError;
use crate::model::{Annotation, FramePayload};

/// Box stroke width in surface pixels.
pub const BOX_STROKE_WIDTH: f32 = 2.0;

/// Point prompt radius in surface pixels.
pub const POINT_RADIUS: f32 = 5.0;

/// Indicator text when the overlay is on but no segmentation covers the
/// frame yet.
pub const NO_SEGMENTATION_TEXT: &str = "No Segmented Image";

/// Visual style of a point prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStyle {
    /// Positive prompt, filled blue
    Positive,
    /// Negative prompt, filled red
    Negative,
}

/// One drawing primitive in surface pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Stroke the (canonical) box outline, red, [`BOX_STROKE_WIDTH`] wide.
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Fill a point prompt circle of [`POINT_RADIUS`].
    FillCircle { x: f32, y: f32, style: PointStyle },
}

/// Background behind the annotation overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Background<'a> {
    /// The raw frame image (base64)
    Image(&'a str),
    /// The segmentation overlay image (base64)
    Segmented(&'a str),
    /// Overlay requested but the frame has no segmentation yet; render the
    /// [`NO_SEGMENTATION_TEXT`] indicator, never a broken image.
    MissingSegmentation,
}

/// Fully resolved view of the active frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScene<'a> {
    pub frame_number: i64,
    pub background: Background<'a>,
    pub commands: Vec<DrawCommand>,
}

/// What the canvas area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene<'a> {
    /// Fetch in flight, placeholder surface
    Loading,
    /// The active frame's fetch failed; the message replaces the canvas and
    /// drawing controls are inert until a successful navigation
    Failed(&'a str),
    /// A resolved frame with its annotation overlay
    Frame(FrameScene<'a>),
}

/// Build the scene for the active frame.
///
/// `draft` is the client's current draft for the frame; when the frame has
/// never been visited locally it falls back to the payload's server-side
/// annotation.
pub fn build_scene<'a>(
    payload: Option<&'a FramePayload>,
    draft: Option<&'a Annotation>,
    show_segmentation: bool,
    error: Option<&'a str>,
    surface_width: u32,
    surface_height: u32,
) -> Result<Scene<'a>, AnnotatorError> {
    if surface_width == 0 || surface_height == 0 {
        return Err(AnnotatorError::InvalidDimension {
            width: surface_width,
            height: surface_height,
        });
    }
    if let Some(message) = error {
        return Ok(Scene::Failed(message));
    }
    let Some(payload) = payload else {
        return Ok(Scene::Loading);
    };

    let background = if show_segmentation {
        match payload.segmented_image.as_deref() {
            Some(seg) => Background::Segmented(seg),
            None => Background::MissingSegmentation,
        }
    } else {
        Background::Image(&payload.image)
    };

    let mut commands = Vec::new();
    let annotation = draft.or(payload.annotation.as_ref());
    if let Some(annotation) = annotation {
        if let Some(b) = annotation.bounding_box() {
            let (x, y, width, height) = b.to_pixels(surface_width, surface_height);
            commands.push(DrawCommand::StrokeRect {
                x,
                y,
                width,
                height,
            });
        }
        for point in annotation.positive_points() {
            let (x, y) = point.to_pixels(surface_width, surface_height);
            commands.push(DrawCommand::FillCircle {
                x,
                y,
                style: PointStyle::Positive,
            });
        }
        for point in annotation.negative_points() {
            let (x, y) = point.to_pixels(surface_width, surface_height);
            commands.push(DrawCommand::FillCircle {
                x,
                y,
                style: PointStyle::Negative,
            });
        }
    }

    Ok(Scene::Frame(FrameScene {
        frame_number: payload.frame_number,
        background,
        commands,
    }))
}
