//! Camera module for the pan/zoom view transform.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Camera state defining the canvas-to-screen transform.
///
/// `point` is the pan offset in canvas units; `zoom` is the scale factor.
/// The transform pair is `screen_to_canvas(p) = p / zoom - point` and
/// `canvas_to_screen(p) = (p + point) * zoom`. Zoom bounds are a policy of
/// the embedding UI, not of the transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Pan offset in canvas units.
    pub point: Vec2,
    /// Zoom factor, always positive.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            point: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point::new(point.x / self.zoom - self.point.x, point.y / self.zoom - self.point.y)
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, point: Point) -> Point {
        Point::new(
            (point.x + self.point.x) * self.zoom,
            (point.y + self.point.y) * self.zoom,
        )
    }

    /// Pan the camera by a delta in canvas units.
    ///
    /// Wheel semantics: a positive delta scrolls content up/left, so the
    /// offset decreases.
    pub fn pan(&mut self, delta: Vec2) {
        self.point -= delta;
    }

    /// Change zoom, keeping the canvas point under `center` (a screen point)
    /// stationary. Non-positive zoom requests are ignored.
    pub fn zoom_to(&mut self, center: Point, next_zoom: f64) {
        if next_zoom <= 0.0 {
            return;
        }
        let anchor = self.screen_to_canvas(center);
        self.zoom = next_zoom;
        // Re-solve the pan offset so `anchor` maps back to `center`
        self.point = Vec2::new(center.x / self.zoom - anchor.x, center.y / self.zoom - anchor.y);
    }
}
