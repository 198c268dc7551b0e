//! Image shape, including the page background image.

use crate::geometry::Bounds;
use crate::shapes::{StyleRecord, unique_id};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Measurement ratio used when a background image carries no explicit scale.
pub const BASE_SCALE: f64 = 1.0;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Real-world scale attached to a background image, e.g. a floor plan where
/// one canvas unit equals `ratio` of `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgImageScale {
    pub unit: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageShape {
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
    /// Opaque source reference (URL or object handle), never interpreted here.
    pub src: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_background: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<BgImageScale>,
}

impl ImageShape {
    pub fn new(point: Point, size: [f64; 2], src: String, child_index: f64) -> Self {
        Self {
            id: unique_id(),
            child_index,
            point,
            rotation: 0.0,
            styles: StyleRecord::default(),
            size,
            src,
            is_background: false,
            scale: None,
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

    /// Measurement ratio, falling back to the base scale.
    pub fn scale_ratio(&self) -> f64 {
        self.scale.as_ref().map_or(BASE_SCALE, |s| s.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_ratio_falls_back_to_base() {
        let image = ImageShape::new(Point::ZERO, [64.0, 64.0], "blob:1".to_string(), 1.0);
        assert!((image.scale_ratio() - BASE_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_background_flag_omitted_when_false() {
        let image = ImageShape::new(Point::ZERO, [64.0, 64.0], "blob:1".to_string(), 1.0);
        let record = serde_json::to_value(&image).expect("serialize");
        assert!(record.get("isBackground").is_none());
        assert!(record.get("scale").is_none());
    }

    #[test]
    fn test_background_record_round_trips() {
        let mut image = ImageShape::new(Point::ZERO, [640.0, 480.0], "plan.png".to_string(), 0.0);
        image.is_background = true;
        image.scale = Some(BgImageScale {
            unit: "m".to_string(),
            ratio: 0.05,
        });

        let record = serde_json::to_value(&image).expect("serialize");
        assert_eq!(record.get("isBackground").and_then(|v| v.as_bool()), Some(true));
        let back: ImageShape = serde_json::from_value(record).expect("deserialize");
        assert_eq!(back, image);
        assert!((back.scale_ratio() - 0.05).abs() < f64::EPSILON);
    }
}
