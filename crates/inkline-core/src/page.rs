//! Document store: the authoritative shape container of a page.

use crate::shapes::{BgImageScale, Shape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canvas metadata of a page: pixel size and optional background source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasInfo {
    pub size: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<BgImageScale>,
}

impl Default for CanvasInfo {
    fn default() -> Self {
        Self {
            size: [0.0, 0.0],
            src: None,
            scale: None,
        }
    }
}

/// A page: keyed shape collection plus canvas metadata.
///
/// Insertion order is irrelevant; stacking order derives from each shape's
/// `child_index`. Every map key equals its shape's own id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub canvas: CanvasInfo,
    #[serde(default)]
    pub shapes: BTreeMap<String, Shape>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            id: "page".to_string(),
            canvas: CanvasInfo::default(),
            shapes: BTreeMap::new(),
        }
    }
}

impl Page {
    /// Insert a shape, keyed by its own id.
    pub fn add_shape(&mut self, shape: Shape) {
        log::debug!("add shape {} ({})", shape.id(), shape.shape_type().as_str());
        self.shapes.insert(shape.id().to_string(), shape);
    }

    /// Replace a shape wholesale. Inserts if the id is new.
    pub fn update_shape(&mut self, shape: Shape) {
        self.shapes.insert(shape.id().to_string(), shape);
    }

    /// Remove a shape, returning it if present.
    pub fn remove_shape(&mut self, id: &str) -> Option<Shape> {
        let removed = self.shapes.remove(id);
        if removed.is_some() {
            log::debug!("remove shape {id}");
        }
        removed
    }

    pub fn get_shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// First shape matching the predicate, in unspecified order.
    pub fn find(&self, predicate: impl Fn(&Shape) -> bool) -> Option<&Shape> {
        self.shapes.values().find(|s| predicate(s))
    }

    /// All shapes sorted by stacking order, back to front.
    pub fn shapes_in_order(&self) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self.shapes.values().collect();
        shapes.sort_by(|a, b| {
            a.child_index()
                .partial_cmp(&b.child_index())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        shapes
    }

    /// A z-order key strictly above every current shape.
    pub fn next_child_index(&self) -> f64 {
        self.shapes
            .values()
            .map(Shape::child_index)
            .fold(f64::NEG_INFINITY, f64::max)
            .max(0.0)
            + 1.0
    }

    /// A z-order key strictly below every current shape.
    pub fn min_child_index(&self) -> f64 {
        self.shapes
            .values()
            .map(Shape::child_index)
            .fold(f64::INFINITY, f64::min)
            .min(1.0)
            - 1.0
    }

    /// The page's background image, if one exists.
    pub fn background_image(&self) -> Option<&Shape> {
        self.find(|s| s.is_background_image())
    }

    /// A serializable snapshot of this page.
    pub fn export(&self) -> Page {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{RectShape, StyleRecord};
    use kurbo::Point;

    fn rect(child_index: f64) -> Shape {
        Shape::Rectangle(RectShape::new(
            Point::ZERO,
            [10.0, 10.0],
            child_index,
            &StyleRecord::defaults(),
        ))
    }

    #[test]
    fn test_add_get_remove() {
        let mut page = Page::default();
        let shape = rect(1.0);
        let id = shape.id().to_string();

        page.add_shape(shape);
        assert!(page.get_shape(&id).is_some());
        assert!(page.remove_shape(&id).is_some());
        assert!(page.get_shape(&id).is_none());
        assert!(page.remove_shape(&id).is_none());
    }

    #[test]
    fn test_update_replaces_by_id() {
        let mut page = Page::default();
        let shape = rect(1.0);
        let id = shape.id().to_string();
        page.add_shape(shape.clone());

        let moved = shape.translate(Point::new(50.0, 50.0), 1.0);
        page.update_shape(moved);

        assert_eq!(page.shapes.len(), 1);
        assert_eq!(page.get_shape(&id).map(Shape::point), Some(Point::new(50.0, 50.0)));
    }

    #[test]
    fn test_child_index_monotonicity() {
        let mut page = Page::default();
        assert!((page.next_child_index() - 1.0).abs() < f64::EPSILON);
        assert!((page.min_child_index() - 0.0).abs() < f64::EPSILON);

        page.add_shape(rect(2.5));
        page.add_shape(rect(-1.0));

        let next = page.next_child_index();
        let min = page.min_child_index();
        for shape in page.shapes.values() {
            assert!(next > shape.child_index());
            assert!(min < shape.child_index());
        }
    }

    #[test]
    fn test_shapes_in_order_sorts_by_child_index() {
        let mut page = Page::default();
        page.add_shape(rect(3.0));
        page.add_shape(rect(1.0));
        page.add_shape(rect(2.0));

        let order: Vec<f64> = page.shapes_in_order().iter().map(|s| s.child_index()).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_find_by_predicate() {
        let mut page = Page::default();
        page.add_shape(rect(1.0));
        assert!(page.find(|s| s.child_index() > 0.5).is_some());
        assert!(page.find(|s| s.child_index() > 5.0).is_none());
    }

    #[test]
    fn test_export_round_trips() {
        let mut page = Page::default();
        page.canvas.size = [800.0, 600.0];
        page.add_shape(rect(1.0));

        let json = serde_json::to_string(&page.export()).expect("serialize");
        let back: Page = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, page);
    }
}
