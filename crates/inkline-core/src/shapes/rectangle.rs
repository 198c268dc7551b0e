//! Axis-aligned rectangle shape.

use crate::geometry::Bounds;
use crate::shapes::{ShapeType, StyleRecord, unique_id};
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    pub id: String,
    #[serde(default)]
    pub child_index: f64,
    pub point: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub styles: StyleRecord,
    /// Width and height in canvas units.
    pub size: [f64; 2],
}

impl RectShape {
    pub fn new(point: Point, size: [f64; 2], child_index: f64, styles: &StyleRecord) -> Self {
        Self {
            id: unique_id(),
            child_index,
            point,
            rotation: 0.0,
            styles: styles.pick(ShapeType::Rectangle.style_props()),
            size,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.point.x,
            self.point.y,
            self.point.x + self.size[0],
            self.point.y + self.size[1],
        )
    }

    /// Copy with a different size. Degenerate sizes are allowed; rendering
    /// policy decides what to do with them.
    pub fn with_size(&self, size: [f64; 2]) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}
