//! Geometry helpers shared by shapes, stores and tools.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with cached extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds from min/max corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Smallest bounds containing all of the given points.
    ///
    /// Empty input yields zero bounds at the origin.
    pub fn from_points(points: &[Point]) -> Self {
        if points.is_empty() {
            return Self::new(0.0, 0.0, 0.0, 0.0);
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x, max_y)
    }

    /// Translate the bounds by a point treated as an offset.
    pub fn translated(&self, offset: Point) -> Self {
        Self::new(
            self.min_x + offset.x,
            self.min_y + offset.y,
            self.max_x + offset.x,
            self.max_y + offset.y,
        )
    }

    /// Center of the bounds.
    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width / 2.0,
            self.min_y + self.height / 2.0,
        )
    }

    /// Check whether a point lies inside the bounds (inclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }
}

/// Round a scalar to two decimal places.
pub fn to_fixed(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round both components of a point to two decimal places.
pub fn point_to_fixed(point: Point) -> Point {
    Point::new(to_fixed(point.x), to_fixed(point.y))
}

/// Snap a point to a grid. A grid of 1 leaves the point untouched.
pub fn snap_to_grid(point: Point, grid: f64) -> Point {
    if grid == 1.0 {
        return point;
    }
    Point::new(
        (point.x / grid).round() * grid,
        (point.y / grid).round() * grid,
    )
}

/// Angle of the vector from `a` to `b`, normalized to [0, 2π).
pub fn normalized_angle(a: Point, b: Point) -> f64 {
    let angle = (b.y - a.y).atan2(b.x - a.x);
    angle.rem_euclid(std::f64::consts::TAU)
}

/// Snap an angle to the nearest of `segments` equal divisions of a full turn.
pub fn snap_angle_to_segments(angle: f64, segments: u32) -> f64 {
    let seg = std::f64::consts::TAU / segments as f64;
    ((angle / seg).round() * seg).rem_euclid(std::f64::consts::TAU)
}

/// Rotate `point` around `center` by `angle` radians.
pub fn rotate_around(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let v = point - center;
    center + Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
