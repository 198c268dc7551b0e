//! View store: camera, selection and editor settings for one page.
//!
//! Independent of the shape collection; the state manager is responsible for
//! keeping its ids in sync with the document store.

use crate::camera::Camera;
use crate::shapes::StyleRecord;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Editor settings: grid and the style defaults for newly created shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Grid cell size in canvas units. A grid of 1 disables snapping.
    pub grid: f64,
    pub hide_grid: bool,
    pub styles: StyleRecord,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: 1.0,
            hide_grid: true,
            styles: StyleRecord::defaults(),
        }
    }
}

impl Settings {
    /// Effective grid for snapping: 1 (no snap) while the grid is hidden.
    pub fn grid_factor(&self) -> f64 {
        if self.hide_grid { 1.0 } else { self.grid }
    }
}

/// Per-page view state. Single-selection model: at most one shape is
/// selected, hovered or edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub id: String,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovered_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing_id: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

impl PageState {
    pub fn new(page_id: &str) -> Self {
        Self {
            id: page_id.to_string(),
            ..Default::default()
        }
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected_id = id;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id.as_deref() == Some(id)
    }

    /// Clear any reference to the given shape id. Called when a shape is
    /// removed so the view state never points at a dangling id.
    pub fn forget_shape(&mut self, id: &str) {
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        if self.hovered_id.as_deref() == Some(id) {
            self.hovered_id = None;
        }
        if self.editing_id.as_deref() == Some(id) {
            self.editing_id = None;
        }
    }

    /// Drop selection, hover and edit state at once.
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
        self.hovered_id = None;
        self.editing_id = None;
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        self.camera.screen_to_canvas(point)
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        self.camera.canvas_to_screen(point)
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    pub fn zoom_to(&mut self, center: Point, next_zoom: f64) {
        self.camera.zoom_to(center, next_zoom);
    }
}
