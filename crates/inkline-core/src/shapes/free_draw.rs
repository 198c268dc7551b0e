//! Freehand stroke shape.
//!
//! Points are stored relative to the shape origin so the whole stroke
//! translates by moving `point` alone.

use crate::geometry::{Bounds, point_to_fixed};
use crate::shapes::{ShapeType, StyleRecord, unique_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeDrawShape {
    pub id: String,
    #[serde(default)]
    pub child_index: f64,
    pub point: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub styles: StyleRecord,
    #[serde(default)]
    pub points: Vec<Point>,
}

impl FreeDrawShape {
    /// A new stroke starting at `point`, with the start recorded as the
    /// first (zero) local point.
    pub fn new(point: Point, child_index: f64, styles: &StyleRecord) -> Self {
        Self {
            id: unique_id(),
            child_index,
            point,
            rotation: 0.0,
            styles: styles.pick(ShapeType::FreeDraw.style_props()),
            points: vec![Point::ZERO],
        }
    }

    /// Append a canvas-space point, stored relative to the origin.
    pub fn with_point(&self, canvas_point: Point) -> Self {
        let mut next = self.clone();
        next.points.push(point_to_fixed(canvas_point - self.point.to_vec2()));
        next
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points).translated(self.point)
    }

    /// Shift the origin to the stroke's top-left corner so every local
    /// point is non-negative. Called once when the stroke is finished.
    pub fn normalized(&self) -> Self {
        let bounds = Bounds::from_points(&self.points);
        let offset = Vec2::new(bounds.min_x, bounds.min_y);
        if offset == Vec2::ZERO {
            return self.clone();
        }
        let mut next = self.clone();
        next.point = point_to_fixed(self.point + offset);
        next.points = self.points.iter().map(|p| point_to_fixed(*p - offset)).collect();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_point_stores_relative() {
        let stroke = FreeDrawShape::new(Point::new(100.0, 100.0), 1.0, &StyleRecord::defaults());
        let stroke = stroke.with_point(Point::new(110.0, 95.0));
        assert_eq!(stroke.points.len(), 2);
        assert_eq!(stroke.points[1], Point::new(10.0, -5.0));
    }

    #[test]
    fn test_with_point_returns_new_instance() {
        let stroke = FreeDrawShape::new(Point::ZERO, 1.0, &StyleRecord::defaults());
        let extended = stroke.with_point(Point::new(5.0, 5.0));
        assert_eq!(stroke.points.len(), 1);
        assert_eq!(extended.points.len(), 2);
    }

    #[test]
    fn test_normalized_shifts_origin() {
        let stroke = FreeDrawShape::new(Point::new(100.0, 100.0), 1.0, &StyleRecord::defaults())
            .with_point(Point::new(90.0, 80.0))
            .with_point(Point::new(130.0, 110.0));
        let normalized = stroke.normalized();

        assert_eq!(normalized.point, Point::new(90.0, 80.0));
        for p in &normalized.points {
            assert!(p.x >= 0.0 && p.y >= 0.0);
        }
        // Canvas-space bounds are unchanged
        let before = stroke.bounds();
        let after = normalized.bounds();
        assert!((before.min_x - after.min_x).abs() < 1e-9);
        assert!((before.max_y - after.max_y).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_is_identity_when_anchored() {
        let stroke = FreeDrawShape::new(Point::new(5.0, 5.0), 1.0, &StyleRecord::defaults())
            .with_point(Point::new(10.0, 10.0));
        assert_eq!(stroke.normalized(), stroke);
    }
}
