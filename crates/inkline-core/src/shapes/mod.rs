//! Shape model: immutable document entities.
//!
//! Shapes are value objects. Every mutation (`translate`, `rotate`,
//! `set_styles`, `apply`) takes `&self` and returns a new instance, so no
//! in-place change is observable outside the producing call.

mod free_draw;
mod image;
mod line;
mod rectangle;
mod text;

pub use free_draw::FreeDrawShape;
pub use image::{BASE_SCALE, BgImageScale, ImageShape};
pub use line::{Handle, HandleKey, LineHandles, LineShape, MeasureLineShape};
pub use rectangle::RectShape;
pub use text::TextShape;

use crate::geometry::{Bounds, normalized_angle, snap_angle_to_segments, snap_to_grid};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of angle segments used for rotation/handle snapping (15° each).
pub const ANGLE_SNAP_SEGMENTS: u32 = 24;

/// Generate a fresh shape id.
pub fn unique_id() -> String {
    Uuid::new_v4().to_string()
}

/// Type tag of a shape variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "line")]
    Line,
    #[serde(rename = "measureLine")]
    MeasureLine,
    #[serde(rename = "freeDraw")]
    FreeDraw,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "text")]
    Text,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Line => "line",
            ShapeType::MeasureLine => "measureLine",
            ShapeType::FreeDraw => "freeDraw",
            ShapeType::Image => "image",
            ShapeType::Text => "text",
        }
    }

    /// The style properties applicable to this shape type. Patch keys
    /// outside this set are ignored by `set_styles`.
    pub fn style_props(&self) -> &'static [StyleProp] {
        match self {
            ShapeType::Rectangle => &[StyleProp::Color, StyleProp::Fill, StyleProp::Size],
            ShapeType::Line | ShapeType::MeasureLine | ShapeType::FreeDraw | ShapeType::Text => {
                &[StyleProp::Color, StyleProp::Size]
            }
            ShapeType::Image => &[],
        }
    }
}

/// A single style property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleProp {
    Color,
    Fill,
    Size,
}

/// Stroke weight presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeStyle {
    S,
    M,
    L,
}

/// Sparse style record: only the properties a variant declares are ever set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeStyle>,
}

impl StyleRecord {
    /// Default styles applied to newly created shapes.
    pub fn defaults() -> Self {
        Self {
            color: Some("#1c7ed6".to_string()),
            fill: None,
            size: Some(SizeStyle::M),
        }
    }

    /// A copy of this record restricted to the given property set.
    pub fn pick(&self, props: &[StyleProp]) -> Self {
        let mut out = Self::default();
        for prop in props {
            match prop {
                StyleProp::Color => out.color = self.color.clone(),
                StyleProp::Fill => out.fill = self.fill.clone(),
                StyleProp::Size => out.size = self.size,
            }
        }
        out
    }

    /// Merge the set properties of `patch` into this record.
    pub fn merge(&mut self, patch: &StyleRecord) {
        if patch.color.is_some() {
            self.color = patch.color.clone();
        }
        if patch.fill.is_some() {
            self.fill = patch.fill.clone();
        }
        if patch.size.is_some() {
            self.size = patch.size;
        }
    }
}

/// Generic copy-on-write patch over the attributes common to all shapes.
#[derive(Debug, Clone, Default)]
pub struct ShapePatch {
    pub point: Option<Point>,
    pub rotation: Option<f64>,
    pub child_index: Option<f64>,
    pub styles: Option<StyleRecord>,
}

/// A document shape. Closed tagged union, discriminated by the `type` tag in
/// its serialized record form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    #[serde(rename = "rectangle")]
    Rectangle(RectShape),
    #[serde(rename = "line")]
    Line(LineShape),
    #[serde(rename = "measureLine")]
    MeasureLine(MeasureLineShape),
    #[serde(rename = "freeDraw")]
    FreeDraw(FreeDrawShape),
    #[serde(rename = "image")]
    Image(ImageShape),
    #[serde(rename = "text")]
    Text(TextShape),
}

impl Shape {
    pub fn id(&self) -> &str {
        match self {
            Shape::Rectangle(s) => &s.id,
            Shape::Line(s) => &s.id,
            Shape::MeasureLine(s) => &s.id,
            Shape::FreeDraw(s) => &s.id,
            Shape::Image(s) => &s.id,
            Shape::Text(s) => &s.id,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Rectangle(_) => ShapeType::Rectangle,
            Shape::Line(_) => ShapeType::Line,
            Shape::MeasureLine(_) => ShapeType::MeasureLine,
            Shape::FreeDraw(_) => ShapeType::FreeDraw,
            Shape::Image(_) => ShapeType::Image,
            Shape::Text(_) => ShapeType::Text,
        }
    }

    pub fn child_index(&self) -> f64 {
        match self {
            Shape::Rectangle(s) => s.child_index,
            Shape::Line(s) => s.child_index,
            Shape::MeasureLine(s) => s.child_index,
            Shape::FreeDraw(s) => s.child_index,
            Shape::Image(s) => s.child_index,
            Shape::Text(s) => s.child_index,
        }
    }

    pub fn point(&self) -> Point {
        match self {
            Shape::Rectangle(s) => s.point,
            Shape::Line(s) => s.point,
            Shape::MeasureLine(s) => s.point,
            Shape::FreeDraw(s) => s.point,
            Shape::Image(s) => s.point,
            Shape::Text(s) => s.point,
        }
    }

    pub fn rotation(&self) -> f64 {
        match self {
            Shape::Rectangle(s) => s.rotation,
            Shape::Line(s) => s.rotation,
            Shape::MeasureLine(s) => s.rotation,
            Shape::FreeDraw(s) => s.rotation,
            Shape::Image(s) => s.rotation,
            Shape::Text(s) => s.rotation,
        }
    }

    pub fn styles(&self) -> &StyleRecord {
        match self {
            Shape::Rectangle(s) => &s.styles,
            Shape::Line(s) => &s.styles,
            Shape::MeasureLine(s) => &s.styles,
            Shape::FreeDraw(s) => &s.styles,
            Shape::Image(s) => &s.styles,
            Shape::Text(s) => &s.styles,
        }
    }

    /// Axis-aligned bounds. Pure function of the shape's own fields.
    pub fn bounds(&self) -> Bounds {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Line(s) => s.bounds(),
            Shape::MeasureLine(s) => s.bounds(),
            Shape::FreeDraw(s) => s.bounds(),
            Shape::Image(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
        }
    }

    /// Apply a generic patch, returning a new shape.
    pub fn apply(&self, patch: &ShapePatch) -> Shape {
        let mut next = self.clone();
        {
            let (point, rotation, child_index, styles) = match &mut next {
                Shape::Rectangle(s) => (&mut s.point, &mut s.rotation, &mut s.child_index, &mut s.styles),
                Shape::Line(s) => (&mut s.point, &mut s.rotation, &mut s.child_index, &mut s.styles),
                Shape::MeasureLine(s) => (&mut s.point, &mut s.rotation, &mut s.child_index, &mut s.styles),
                Shape::FreeDraw(s) => (&mut s.point, &mut s.rotation, &mut s.child_index, &mut s.styles),
                Shape::Image(s) => (&mut s.point, &mut s.rotation, &mut s.child_index, &mut s.styles),
                Shape::Text(s) => (&mut s.point, &mut s.rotation, &mut s.child_index, &mut s.styles),
            };
            if let Some(p) = patch.point {
                *point = p;
            }
            if let Some(r) = patch.rotation {
                *rotation = r.rem_euclid(std::f64::consts::TAU);
            }
            if let Some(ci) = patch.child_index {
                *child_index = ci;
            }
            if let Some(s) = &patch.styles {
                *styles = s.clone();
            }
        }
        next
    }

    /// Move the shape to a new origin, snapped to the grid.
    pub fn translate(&self, point: Point, grid: f64) -> Shape {
        self.apply(&ShapePatch {
            point: Some(snap_to_grid(point, grid)),
            ..Default::default()
        })
    }

    /// Rotate towards the cursor around the bounds center, optionally
    /// snapping to 15° increments.
    pub fn rotate(&self, cursor: Point, snap_to_angle: bool) -> Shape {
        let center = self.bounds().center();
        let angle = normalized_angle(center, cursor);
        let rotation = if snap_to_angle {
            snap_angle_to_segments(angle, ANGLE_SNAP_SEGMENTS)
        } else {
            angle
        };
        self.apply(&ShapePatch {
            rotation: Some(rotation),
            ..Default::default()
        })
    }

    /// Replace the declared style properties from the incoming record;
    /// properties outside this variant's declared set are ignored.
    pub fn set_styles(&self, styles: &StyleRecord) -> Shape {
        self.apply(&ShapePatch {
            styles: Some(styles.pick(self.shape_type().style_props())),
            ..Default::default()
        })
    }

    /// Named handles, for the line family. `None` for other variants.
    pub fn handles(&self) -> Option<&LineHandles> {
        match self {
            Shape::Line(s) => Some(&s.handles),
            Shape::MeasureLine(s) => Some(&s.handles),
            _ => None,
        }
    }

    /// Move a named handle by `delta`. Returns `None` for variants without
    /// handles; callers are expected to check.
    pub fn move_handle(&self, key: HandleKey, delta: Vec2, snap_to_angle: bool, grid: f64) -> Option<Shape> {
        match self {
            Shape::Line(s) => Some(Shape::Line(s.move_handle(key, delta, snap_to_angle, grid))),
            Shape::MeasureLine(s) => {
                Some(Shape::MeasureLine(s.move_handle(key, delta, snap_to_angle, grid)))
            }
            _ => None,
        }
    }

    /// True for the page's background image.
    pub fn is_background_image(&self) -> bool {
        matches!(self, Shape::Image(s) if s.is_background)
    }
}
