//! Normalized coordinate space and annotation shapes.
//!
//! All persisted geometry is expressed as fractions of the rendered frame
//! size, so stored annotations are independent of any particular surface
//! pixel size. This module is pure coordinate math, extracted for
//! testability.

use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;

/// A point in normalized coordinates, each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a point directly from normalized coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalize a pixel position against the render surface size.
    ///
    /// Fails if either surface dimension is zero.
    pub fn from_pixels(
        px: f32,
        py: f32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Self, AnnotatorError> {
        if surface_width == 0 || surface_height == 0 {
            return Err(AnnotatorError::InvalidDimension {
                width: surface_width,
                height: surface_height,
            });
        }
        Ok(Self {
            x: px / surface_width as f32,
            y: py / surface_height as f32,
        })
    }

    /// Project back onto a render surface.
    pub fn to_pixels(&self, surface_width: u32, surface_height: u32) -> (f32, f32) {
        (
            self.x * surface_width as f32,
            self.y * surface_height as f32,
        )
    }
}

/// A bounding box in normalized coordinates.
///
/// During an active drag `width`/`height` are signed (they encode drag
/// direction); everything that persists or draws a box goes through
/// [`BoundingBox::canonical`], which folds the sign into the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build a box from a drag gesture: origin at the anchor, signed
    /// extents toward the current pointer position.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            width: current.x - anchor.x,
            height: current.y - anchor.y,
        }
    }

    /// Canonical form: non-negative extents with a min-corner origin.
    pub fn canonical(&self) -> Self {
        Self {
            x: self.x.min(self.x + self.width),
            y: self.y.min(self.y + self.height),
            width: self.width.abs(),
            height: self.height.abs(),
        }
    }

    /// Canonical projection onto a render surface as `(x, y, width, height)`.
    pub fn to_pixels(&self, surface_width: u32, surface_height: u32) -> (f32, f32, f32, f32) {
        let c = self.canonical();
        let (x, y) = Point::new(c.x, c.y).to_pixels(surface_width, surface_height);
        (
            x,
            y,
            c.width * surface_width as f32,
            c.height * surface_height as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_from_pixels_normalizes() {
        let p = Point::from_pixels(100.0, 50.0, 800, 600).unwrap();
        assert!((p.x - 0.125).abs() < EPS);
        assert!((p.y - 0.0833).abs() < 1e-3);
    }

    #[test]
    fn test_from_pixels_zero_dimension() {
        assert!(matches!(
            Point::from_pixels(10.0, 10.0, 0, 600),
            Err(AnnotatorError::InvalidDimension { width: 0, .. })
        ));
        assert!(matches!(
            Point::from_pixels(10.0, 10.0, 800, 0),
            Err(AnnotatorError::InvalidDimension { height: 0, .. })
        ));
    }

    #[test]
    fn test_pixel_round_trip() {
        let p = Point::from_pixels(300.0, 200.0, 800, 600).unwrap();
        let (px, py) = p.to_pixels(800, 600);
        assert!((px - 300.0).abs() < EPS);
        assert!((py - 200.0).abs() < EPS);
    }

    #[test]
    fn test_box_from_drag_signed() {
        // Dragging up-left keeps the anchor origin and negative extents.
        let anchor = Point::new(0.5, 0.5);
        let current = Point::new(0.25, 0.3);
        let b = BoundingBox::from_drag(anchor, current);
        assert!((b.x - 0.5).abs() < EPS);
        assert!((b.width + 0.25).abs() < EPS);
        assert!((b.height + 0.2).abs() < EPS);
    }

    #[test]
    fn test_canonical_folds_sign_into_origin() {
        let b = BoundingBox {
            x: 0.5,
            y: 0.5,
            width: -0.25,
            height: -0.2,
        };
        let c = b.canonical();
        assert!((c.x - 0.25).abs() < EPS);
        assert!((c.y - 0.3).abs() < EPS);
        assert!((c.width - 0.25).abs() < EPS);
        assert!((c.height - 0.2).abs() < EPS);
    }

    #[test]
    fn test_canonical_is_idempotent() {
        let b = BoundingBox {
            x: 0.1,
            y: 0.2,
            width: 0.3,
            height: 0.4,
        };
        assert_eq!(b.canonical(), b.canonical().canonical());
    }

    #[test]
    fn test_drag_round_trip_reproduces_pixel_path() {
        // Pixel gesture (100,50) -> (300,200) on an 800x600 surface.
        let anchor = Point::from_pixels(100.0, 50.0, 800, 600).unwrap();
        let current = Point::from_pixels(300.0, 200.0, 800, 600).unwrap();
        let b = BoundingBox::from_drag(anchor, current);

        assert!((b.x - 0.125).abs() < EPS);
        assert!((b.y - 0.0833).abs() < 1e-3);
        assert!((b.width - 0.25).abs() < EPS);
        assert!((b.height - 0.25).abs() < EPS);

        let (px, py, pw, ph) = b.to_pixels(800, 600);
        assert!((px - 100.0).abs() < 0.01);
        assert!((py - 50.0).abs() < 0.01);
        assert!((pw - 200.0).abs() < 0.01);
        assert!((ph - 150.0).abs() < 0.01);
    }
}
