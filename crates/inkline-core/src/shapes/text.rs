//! Text label shape.

use crate::geometry::Bounds;
use crate::shapes::{ShapeType, StyleRecord, unique_id};
use kurbo::Point;
use serde::{Deserialize, Serialize};

// Nominal glyph metrics for bounds estimation; real layout lives in the
// rendering layer.
const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    pub id: String,
    #[serde(default)]
    pub child_index: f64,
    pub point: Point,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub styles: StyleRecord,
    #[serde(default)]
    pub text: String,
}

impl TextShape {
    pub fn new(point: Point, text: String, child_index: f64, styles: &StyleRecord) -> Self {
        Self {
            id: unique_id(),
            child_index,
            point,
            rotation: 0.0,
            styles: styles.pick(ShapeType::Text.style_props()),
            text,
        }
    }

    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            ..self.clone()
        }
    }

    pub fn bounds(&self) -> Bounds {
        let lines = self.text.lines().count().max(1);
        let columns = self.text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Bounds::new(
            self.point.x,
            self.point.y,
            self.point.x + columns as f64 * CHAR_WIDTH,
            self.point.y + lines as f64 * LINE_HEIGHT,
        )
    }
}
