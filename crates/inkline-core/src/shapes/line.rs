//! Line shapes: a plain segment and a measuring variant.
//!
//! Both carry two named handles in shape-local coordinates. Moving a handle
//! keeps the invariant that no handle coordinate is negative by shifting the
//! shape origin instead.

use crate::geometry::{
    Bounds, normalized_angle, point_to_fixed, rotate_around, snap_angle_to_segments, snap_to_grid,
};
use crate::shapes::{ANGLE_SNAP_SEGMENTS, ShapeType, StyleRecord, unique_id};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Identifier of a line handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKey {
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "end")]
    End,
}

impl HandleKey {
    pub fn opposite(&self) -> HandleKey {
        match self {
            HandleKey::Start => HandleKey::End,
            HandleKey::End => HandleKey::Start,
        }
    }
}

/// A draggable control point, in shape-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub id: HandleKey,
    pub index: u32,
    pub point: Point,
}

/// The two handles of a line shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineHandles {
    pub start: Handle,
    pub end: Handle,
}

impl Default for LineHandles {
    fn default() -> Self {
        Self {
            start: Handle {
                id: HandleKey::Start,
                index: 0,
                point: Point::ZERO,
            },
            end: Handle {
                id: HandleKey::End,
                index: 1,
                point: Point::new(1.0, 1.0),
            },
        }
    }
}

impl LineHandles {
    pub fn get(&self, key: HandleKey) -> &Handle {
        match key {
            HandleKey::Start => &self.start,
            HandleKey::End => &self.end,
        }
    }

    fn get_mut(&mut self, key: HandleKey) -> &mut Handle {
        match key {
            HandleKey::Start => &mut self.start,
            HandleKey::End => &mut self.end,
        }
    }

    /// Segment length in canvas units.
    pub fn length(&self) -> f64 {
        (self.end.point - self.start.point).hypot()
    }
}

/// Move one handle of a line-family shape.
///
/// Applies the optional angle snap (measured from the opposite handle), then
/// the grid snap, then re-anchors: if either handle ended up with a negative
/// coordinate the shape origin absorbs the difference so local coordinates
/// stay non-negative.
fn move_line_handle(
    origin: Point,
    handles: &LineHandles,
    key: HandleKey,
    delta: Vec2,
    snap_to_angle: bool,
    grid: f64,
) -> (Point, LineHandles) {
    let mut next = handles.clone();

    let mut point = point_to_fixed(handles.get(key).point + delta);
    if snap_to_angle {
        let anchor = handles.get(key.opposite()).point;
        let angle = normalized_angle(anchor, point);
        let snapped = snap_angle_to_segments(angle, ANGLE_SNAP_SEGMENTS);
        point = rotate_around(point, anchor, snapped - angle);
    }
    next.get_mut(key).point = point_to_fixed(snap_to_grid(point, grid));

    // Re-anchor so both handles stay in the positive quadrant.
    let bounds = Bounds::from_points(&[next.start.point, next.end.point]);
    let offset = Vec2::new(bounds.min_x, bounds.min_y);
    next.start.point = point_to_fixed(next.start.point - offset);
    next.end.point = point_to_fixed(next.end.point - offset);

    (point_to_fixed(origin + offset), next)
}

fn line_bounds(origin: Point, handles: &LineHandles) -> Bounds {
    Bounds::from_points(&[handles.start.point, handles.end.point])
        .translated(origin)
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    pub id: String,
    #[serde(default)]
    pub child_index: f64,
    pub point: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub styles: StyleRecord,
    #[serde(default)]
    pub handles: LineHandles,
}

impl LineShape {
    pub fn new(point: Point, child_index: f64, styles: &StyleRecord) -> Self {
        Self {
            id: unique_id(),
            child_index,
            point,
            rotation: 0.0,
            styles: styles.pick(ShapeType::Line.style_props()),
            handles: LineHandles::default(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        line_bounds(self.point, &self.handles)
    }

    pub fn move_handle(&self, key: HandleKey, delta: Vec2, snap_to_angle: bool, grid: f64) -> Self {
        let (point, handles) = move_line_handle(self.point, &self.handles, key, delta, snap_to_angle, grid);
        Self {
            point,
            handles,
            ..self.clone()
        }
    }
}

/// A line that reports its length as a real-world measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureLineShape {
    pub id: String,
    #[serde(default)]
    pub child_index: f64,
    pub point: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub styles: StyleRecord,
    #[serde(default)]
    pub handles: LineHandles,
}

impl MeasureLineShape {
    pub fn new(point: Point, child_index: f64, styles: &StyleRecord) -> Self {
        Self {
            id: unique_id(),
            child_index,
            point,
            rotation: 0.0,
            styles: styles.pick(ShapeType::MeasureLine.style_props()),
            handles: LineHandles::default(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        line_bounds(self.point, &self.handles)
    }

    pub fn move_handle(&self, key: HandleKey, delta: Vec2, snap_to_angle: bool, grid: f64) -> Self {
        let (point, handles) = move_line_handle(self.point, &self.handles, key, delta, snap_to_angle, grid);
        Self {
            point,
            handles,
            ..self.clone()
        }
    }

    /// Length scaled by the page's measurement ratio.
    pub fn measurement(&self, ratio: f64) -> f64 {
        self.handles.length() * ratio
    }
}
