//! State manager: the façade composing stores, inputs and the tool machine.
//!
//! This is the only component the rendering and UI layers talk to. Raw
//! events enter here, are normalized, converted to canvas space and routed
//! to the active session or, failing that, the current tool.

use crate::document::Document;
use crate::geometry::Bounds;
use crate::inputs::{Inputs, KeyboardInfo, Platform, PointerInfo, RawKeyEvent, RawPointerEvent, Target};
use crate::page::{CanvasInfo, Page};
use crate::page_state::{PageState, Settings};
use crate::shapes::{BgImageScale, HandleKey, ImageShape, Shape, ShapeType, StyleRecord};
use crate::tools::{Callbacks, ToolType, handle_base_keys, pan_camera, tool_handler, zoom_camera};
use kurbo::{Point, Vec2};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by document import and shape construction.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("unknown shape type: {0}")]
    UnknownShapeType(String),
    #[error("shape record has no type tag")]
    MissingTypeTag,
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// Registry of shape type tags. Adding a variant to the document model is a
/// registration act; records with unregistered tags are rejected.
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    tags: BTreeMap<String, ShapeType>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        let mut registry = Self { tags: BTreeMap::new() };
        for shape_type in [
            ShapeType::Rectangle,
            ShapeType::Line,
            ShapeType::MeasureLine,
            ShapeType::FreeDraw,
            ShapeType::Image,
            ShapeType::Text,
        ] {
            registry.register(shape_type);
        }
        registry
    }
}

impl ShapeRegistry {
    pub fn register(&mut self, shape_type: ShapeType) {
        self.tags.insert(shape_type.as_str().to_string(), shape_type);
    }

    pub fn get(&self, tag: &str) -> Option<ShapeType> {
        self.tags.get(tag).copied()
    }

    /// Check a record's type tag against the registry.
    pub fn validate(&self, record: &Value) -> Result<ShapeType, StateError> {
        let tag = record
            .get("type")
            .and_then(Value::as_str)
            .ok_or(StateError::MissingTypeTag)?;
        self.get(tag)
            .ok_or_else(|| StateError::UnknownShapeType(tag.to_string()))
    }

    /// Construct a shape from its serialized record.
    pub fn shape_from_record(&self, record: Value) -> Result<Shape, StateError> {
        self.validate(&record)?;
        Ok(serde_json::from_value(record)?)
    }
}

/// A callback event as raised by the rendering collaborator, already
/// normalized and (for pointer events) converted to canvas space.
#[derive(Debug, Clone)]
pub enum CallbackEvent {
    PointerDown(PointerInfo),
    PointerMove(PointerInfo),
    PointerUp(PointerInfo),
    PointCanvas(PointerInfo),
    DoubleClickCanvas(PointerInfo),
    PointShape(String, PointerInfo),
    DoubleClickShape(String, PointerInfo),
    PointBounds(PointerInfo),
    PointHandle(HandleKey, PointerInfo),
    Pan(PointerInfo),
    Zoom(PointerInfo),
    KeyDown(KeyboardInfo),
    KeyUp(KeyboardInfo),
}

/// Callback invoked when a session completes, registered at session start.
pub type SessionCompletion = Box<dyn FnOnce(&mut StateManager)>;

/// The editing state engine façade.
pub struct StateManager {
    page: Page,
    page_state: PageState,
    inputs: Inputs,
    registry: ShapeRegistry,
    tool: ToolType,
    session: Option<Box<dyn Callbacks>>,
    session_active: bool,
    on_session_complete: Option<SessionCompletion>,
    centered_once: bool,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(Platform::default())
    }
}

impl StateManager {
    pub fn new(platform: Platform) -> Self {
        let page = Page::default();
        let page_state = PageState::new(&page.id);
        Self {
            page,
            page_state,
            inputs: Inputs::new(platform),
            registry: ShapeRegistry::default(),
            tool: ToolType::default(),
            session: None,
            session_active: false,
            on_session_complete: None,
            centered_once: false,
        }
    }

    // --- store access -----------------------------------------------------

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn page_state(&self) -> &PageState {
        &self.page_state
    }

    pub fn page_state_mut(&mut self) -> &mut PageState {
        &mut self.page_state
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.registry
    }

    // --- tool and session control ----------------------------------------

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolType) {
        log::debug!("tool -> {tool:?}");
        self.tool = tool;
        self.page_state.editing_id = None;
    }

    pub fn in_session(&self) -> bool {
        self.session_active
    }

    /// Start a session. The caller contract allows at most one active
    /// session; a second start is a programmer error and fails fast.
    pub fn start_session(&mut self, session: Box<dyn Callbacks>, on_complete: Option<SessionCompletion>) {
        if self.session_active {
            panic!("a session is already active");
        }
        log::debug!("session started");
        self.session_active = true;
        self.session = Some(session);
        self.on_session_complete = on_complete;
    }

    /// End the active session and run its completion callback. A no-op when
    /// no session is active.
    pub fn complete_session(&mut self) {
        if !self.session_active {
            return;
        }
        log::debug!("session completed");
        self.session_active = false;
        self.session = None;
        if let Some(callback) = self.on_session_complete.take() {
            callback(self);
        }
    }

    // --- selection and shape edits ----------------------------------------

    pub fn select_shape(&mut self, id: Option<String>) {
        self.page_state.select(id);
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.page
            .get_shape(self.page_state.selected_id.as_deref()?)
    }

    /// Remove a shape and clear any view-state reference to it.
    pub fn remove_shape(&mut self, id: &str) -> Option<Shape> {
        let removed = self.page.remove_shape(id);
        if removed.is_some() {
            self.page_state.forget_shape(id);
        }
        removed
    }

    /// Remove the selected shape, if any, and clear selection state.
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.page_state.selected_id.clone() {
            self.remove_shape(&id);
            self.page_state.clear_selection();
        }
    }

    /// Insert a shape from its serialized record.
    pub fn create_shape(&mut self, record: Value) -> Result<String, StateError> {
        let shape = self.registry.shape_from_record(record)?;
        let id = shape.id().to_string();
        self.page.add_shape(shape);
        Ok(id)
    }

    // --- styles and settings ----------------------------------------------

    /// Styles shown in the style UI: the selected shape's, or the defaults
    /// for newly created shapes.
    pub fn current_styles(&self) -> StyleRecord {
        match self.selected_shape() {
            Some(shape) => shape.styles().clone(),
            None => self.page_state.settings.styles.clone(),
        }
    }

    /// Apply a style patch to the selected shape, or to the defaults when
    /// nothing is selected.
    pub fn set_styles(&mut self, patch: &StyleRecord) {
        if let Some(shape) = self.selected_shape() {
            let next = shape.set_styles(patch);
            self.page.update_shape(next);
        } else {
            self.page_state.settings.styles.merge(patch);
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.page_state.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.page_state.settings = settings;
    }

    // --- background image -------------------------------------------------

    /// Install the page's background image, replacing any existing one. The
    /// image sits below every other shape and defines the canvas extents.
    pub fn set_background_image(
        &mut self,
        src: String,
        size: [f64; 2],
        scale: Option<BgImageScale>,
    ) -> String {
        if let Some(existing) = self.page.background_image().map(|s| s.id().to_string()) {
            self.remove_shape(&existing);
        }
        let mut image = ImageShape::new(Point::ZERO, size, src.clone(), self.page.min_child_index());
        image.is_background = true;
        image.scale = scale.clone();
        let id = image.id.clone();

        self.page.canvas = CanvasInfo {
            size,
            src: Some(src),
            scale,
        };
        self.page.add_shape(Shape::Image(image));
        id
    }

    /// Measurement ratio of the background image, or the base scale when
    /// the page has no scaled background.
    pub fn scale_ratio(&self) -> f64 {
        match self.page.background_image() {
            Some(Shape::Image(image)) => image.scale_ratio(),
            _ => crate::shapes::BASE_SCALE,
        }
    }

    pub fn remove_background_image(&mut self) {
        if let Some(id) = self.page.background_image().map(|s| s.id().to_string()) {
            self.remove_shape(&id);
        }
        self.page.canvas = CanvasInfo::default();
    }

    // --- camera -----------------------------------------------------------

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        self.page_state.screen_to_canvas(point)
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        self.page_state.canvas_to_screen(point)
    }

    /// Center the canvas extents in the viewport. One-shot per document
    /// load; later calls are no-ops until the next `set_data`.
    pub fn center_camera_once(&mut self, viewport: Bounds) {
        if self.centered_once {
            return;
        }
        self.centered_once = true;
        let zoom = self.page_state.camera.zoom;
        let [width, height] = self.page.canvas.size;
        self.page_state.camera.point = Vec2::new(
            (viewport.width / zoom - width) / 2.0,
            (viewport.height / zoom - height) / 2.0,
        );
    }

    /// Update the canvas's on-screen bounding rectangle.
    pub fn update_bounds(&mut self, bounds: Bounds) {
        self.inputs.update_bounds(bounds);
    }

    // --- load and export --------------------------------------------------

    /// Replace the whole editor state with a document snapshot.
    pub fn set_data(&mut self, document: Document) {
        let page_id = document.page.id.clone();
        self.page = document.page;
        self.page_state = document
            .page_state
            .unwrap_or_else(|| PageState::new(&page_id));
        if let Some(settings) = document.settings {
            self.page_state.settings = settings;
        }
        self.inputs.reset();
        self.session = None;
        self.session_active = false;
        self.on_session_complete = None;
        self.tool = ToolType::Select;
        self.centered_once = false;
        log::info!("document loaded: page {page_id}");
    }

    /// Load a document from its serialized form, rejecting records with
    /// unregistered shape type tags.
    pub fn load_document(&mut self, value: Value) -> Result<(), StateError> {
        if let Some(shapes) = value.pointer("/page/shapes").and_then(Value::as_object) {
            for record in shapes.values() {
                self.registry.validate(record)?;
            }
        }
        let document: Document = serde_json::from_value(value)?;
        self.set_data(document);
        Ok(())
    }

    /// A serializable snapshot of the full editor state.
    pub fn export(&self) -> Document {
        Document {
            page: self.page.export(),
            page_state: Some(self.page_state.clone()),
            settings: Some(self.page_state.settings.clone()),
        }
    }

    // --- raw event entry points -------------------------------------------

    /// Returns whether any handler claimed the event.
    pub fn on_pointer_down(&mut self, event: &RawPointerEvent, target: Target) -> bool {
        if !self.inputs.pointer_is_valid(event) {
            return false;
        }
        let mut info = self.inputs.pointer_down(event, target.clone());
        info.point = self.page_state.screen_to_canvas(info.point);

        if self.dispatch(CallbackEvent::PointerDown(info.clone())) {
            return true;
        }
        match target {
            Target::Canvas => {
                if self.inputs.is_double_click(event.time) {
                    self.dispatch(CallbackEvent::DoubleClickCanvas(info))
                } else {
                    self.dispatch(CallbackEvent::PointCanvas(info))
                }
            }
            Target::Shape(id) => {
                // Click-through: a hit on a non-selected shape inside the
                // selection bounds goes to the bounds handler first, so the
                // selected shape keeps the drag.
                if !self.page_state.is_selected(&id)
                    && self.selection_bounds_contains(info.point)
                    && self.dispatch(CallbackEvent::PointBounds(info.clone()))
                {
                    return true;
                }
                self.dispatch(CallbackEvent::PointShape(id, info))
            }
            Target::Bounds => self.dispatch(CallbackEvent::PointBounds(info)),
            Target::Handle(key) => self.dispatch(CallbackEvent::PointHandle(key, info)),
            Target::PanZoom => false,
        }
    }

    /// Hover reporting. Does not claim the active pointer and never routes
    /// to tools; it only maintains the hovered id.
    pub fn on_pointer_enter(&mut self, event: &RawPointerEvent, target: Target) {
        self.inputs.pointer_enter(event, target.clone());
        self.page_state.hovered_id = match target {
            Target::Shape(id) => Some(id),
            _ => None,
        };
    }

    pub fn on_pointer_move(&mut self, event: &RawPointerEvent, target: Target) -> bool {
        if !self.inputs.pointer_is_valid(event) {
            return false;
        }
        let mut info = self.inputs.pointer_move(event, target);
        info.point = self.page_state.screen_to_canvas(info.point);
        self.dispatch(CallbackEvent::PointerMove(info))
    }

    pub fn on_pointer_up(&mut self, event: &RawPointerEvent, target: Target) -> bool {
        if !self.inputs.pointer_is_valid(event) {
            return false;
        }
        // Read the double-click state before this up overwrites it.
        let double_click = self.inputs.is_double_click(event.time);
        let mut info = self.inputs.pointer_up(event, target.clone());
        info.point = self.page_state.screen_to_canvas(info.point);

        let claimed = self.dispatch(CallbackEvent::PointerUp(info.clone()));
        if let Target::Shape(id) = target {
            // Shape double-clicks fire on release; alt/meta click pairs
            // are modified gestures, not double-clicks.
            if double_click && !(info.alt_key || info.meta_key) {
                return self.dispatch(CallbackEvent::DoubleClickShape(id, info)) || claimed;
            }
        }
        claimed
    }

    /// Wheel/gesture pan. `client` is the cursor position in viewport
    /// coordinates; the delta stays in screen units.
    pub fn on_pan(&mut self, delta: Vec2, client: Point) -> bool {
        let info = self.inputs.panzoom(delta, client);
        self.dispatch(CallbackEvent::Pan(info))
    }

    /// Wheel/gesture zoom anchored at the cursor.
    pub fn on_zoom(&mut self, delta: Vec2, client: Point) -> bool {
        let info = self.inputs.panzoom(delta, client);
        self.dispatch(CallbackEvent::Zoom(info))
    }

    pub fn on_key_down(&mut self, event: &RawKeyEvent) -> bool {
        let info = self.inputs.key_down(event);
        self.dispatch(CallbackEvent::KeyDown(info))
    }

    pub fn on_key_up(&mut self, event: &RawKeyEvent) -> bool {
        let info = self.inputs.key_up(event);
        self.dispatch(CallbackEvent::KeyUp(info))
    }

    /// Clear all transient input state, e.g. on focus loss.
    pub fn reset_inputs(&mut self) {
        self.inputs.reset();
    }

    // --- event routing ----------------------------------------------------

    /// Route one callback event: to the active session if one exists,
    /// otherwise to the current tool. Returns whether it was claimed.
    pub fn dispatch(&mut self, event: CallbackEvent) -> bool {
        if self.session_active {
            let Some(mut session) = self.session.take() else {
                // Re-entrant dispatch from inside a session handler.
                return false;
            };
            let claimed = route(session.as_mut(), self, &event);
            // Keep the session unless it completed while handling the event
            if self.session_active && self.session.is_none() {
                self.session = Some(session);
            }
            claimed
        } else {
            let mut tool = tool_handler(self.tool);
            if route(tool.as_mut(), self, &event) {
                return true;
            }
            // Idle behavior shared by every tool. Sessions never reach this
            // fallback, so the camera and delete keys stay inert while a
            // gesture is in progress.
            match &event {
                CallbackEvent::Pan(info) => {
                    pan_camera(self, info);
                    true
                }
                CallbackEvent::Zoom(info) => {
                    zoom_camera(self, info);
                    true
                }
                CallbackEvent::KeyDown(info) => handle_base_keys(self, info),
                _ => false,
            }
        }
    }

    fn selection_bounds_contains(&self, point: Point) -> bool {
        self.selected_shape()
            .is_some_and(|shape| shape.bounds().contains(point))
    }
}

fn route(handler: &mut dyn Callbacks, sm: &mut StateManager, event: &CallbackEvent) -> bool {
    match event {
        CallbackEvent::PointerDown(info) => handler.on_pointer_down(sm, info),
        CallbackEvent::PointerMove(info) => handler.on_pointer_move(sm, info),
        CallbackEvent::PointerUp(info) => handler.on_pointer_up(sm, info),
        CallbackEvent::PointCanvas(info) => handler.on_point_canvas(sm, info),
        CallbackEvent::DoubleClickCanvas(info) => handler.on_double_click_canvas(sm, info),
        CallbackEvent::PointShape(id, info) => handler.on_point_shape(sm, id, info),
        CallbackEvent::DoubleClickShape(id, info) => handler.on_double_click_shape(sm, id, info),
        CallbackEvent::PointBounds(info) => handler.on_point_bounds(sm, info),
        CallbackEvent::PointHandle(key, info) => handler.on_point_handle(sm, *key, info),
        CallbackEvent::Pan(info) => handler.on_pan(sm, info),
        CallbackEvent::Zoom(info) => handler.on_zoom(sm, info),
        CallbackEvent::KeyDown(info) => handler.on_key_down(sm, info),
        CallbackEvent::KeyUp(info) => handler.on_key_up(sm, info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ModifierKeys;
    use crate::shapes::{RectShape, SizeStyle};
    use crate::tools::TranslateSession;

    fn pointer(pointer_id: u64, x: f64, y: f64, time: f64) -> RawPointerEvent {
        RawPointerEvent {
            pointer_id,
            button: 0,
            client: Point::new(x, y),
            pressure: None,
            modifiers: ModifierKeys::default(),
            time,
        }
    }

    fn key(name: &str) -> RawKeyEvent {
        RawKeyEvent {
            key: name.to_string(),
            modifiers: ModifierKeys::default(),
            time: 0.0,
        }
    }

    fn add_rect(sm: &mut StateManager, x: f64, y: f64, w: f64, h: f64) -> String {
        let child_index = sm.page().next_child_index();
        let rect = RectShape::new(Point::new(x, y), [w, h], child_index, &StyleRecord::defaults());
        let id = rect.id.clone();
        sm.page_mut().add_shape(Shape::Rectangle(rect));
        id
    }

    #[test]
    fn test_delete_key_removes_selected_shape() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);
        sm.select_shape(Some(id.clone()));

        assert!(sm.on_key_down(&key("Delete")));

        assert!(sm.page().get_shape(&id).is_none());
        assert!(sm.page_state().selected_id.is_none());
    }

    #[test]
    fn test_backspace_is_delete() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 10.0, 10.0);
        sm.select_shape(Some(id.clone()));
        sm.on_key_down(&key("Backspace"));
        assert!(sm.page().get_shape(&id).is_none());
    }

    #[test]
    fn test_freehand_draw_gesture() {
        let mut sm = StateManager::default();
        sm.set_tool(ToolType::FreeDraw);

        assert!(sm.on_pointer_down(&pointer(1, 10.0, 10.0, 0.0), Target::Canvas));
        assert!(sm.in_session());
        assert_eq!(sm.page().shapes.len(), 1);
        let id = sm.page().shapes.keys().next().cloned().unwrap();

        sm.on_pointer_move(&pointer(1, 20.0, 10.0, 16.0), Target::Canvas);
        let Some(Shape::FreeDraw(stroke)) = sm.page().get_shape(&id) else {
            panic!("expected a freehand stroke");
        };
        assert_eq!(stroke.points.len(), 2);

        sm.on_pointer_up(&pointer(1, 20.0, 10.0, 32.0), Target::Canvas);
        assert!(!sm.in_session());

        // The next gesture starts a new stroke with a different id
        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 400.0), Target::Canvas);
        assert_eq!(sm.page().shapes.len(), 2);
        assert!(sm.page().shapes.keys().any(|k| k != &id));
    }

    #[test]
    #[should_panic(expected = "a session is already active")]
    fn test_second_session_fails_fast() {
        let mut sm = StateManager::default();
        sm.start_session(
            Box::new(TranslateSession::new("a".to_string(), Vec2::ZERO)),
            None,
        );
        sm.start_session(
            Box::new(TranslateSession::new("b".to_string(), Vec2::ZERO)),
            None,
        );
    }

    #[test]
    fn test_select_and_drag_shape() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);

        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id.clone()));
        assert!(sm.in_session());
        assert_eq!(sm.page_state().selected_id.as_deref(), Some(id.as_str()));

        sm.on_pointer_move(&pointer(1, 80.0, 60.0, 16.0), Target::Shape(id.clone()));
        let shape = sm.page().get_shape(&id).unwrap();
        assert_eq!(shape.point(), Point::new(30.0, 10.0));

        sm.on_pointer_up(&pointer(1, 80.0, 60.0, 32.0), Target::Shape(id.clone()));
        assert!(!sm.in_session());
    }

    #[test]
    fn test_foreign_pointer_ignored_during_gesture() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);

        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id.clone()));
        let before = sm.page().get_shape(&id).unwrap().point();

        // A second pointer's events are rejected while the first drags
        assert!(!sm.on_pointer_down(&pointer(2, 10.0, 10.0, 5.0), Target::Canvas));
        assert!(!sm.on_pointer_move(&pointer(2, 90.0, 90.0, 10.0), Target::Canvas));
        assert_eq!(sm.page().get_shape(&id).unwrap().point(), before);
        assert!(sm.in_session());
    }

    #[test]
    fn test_point_canvas_clears_selection() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 10.0, 10.0);
        sm.select_shape(Some(id));

        sm.on_pointer_down(&pointer(1, 500.0, 500.0, 0.0), Target::Canvas);
        assert!(sm.page_state().selected_id.is_none());
    }

    #[test]
    fn test_missing_shape_falls_through_to_bounds() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);
        sm.select_shape(Some(id.clone()));

        // The hit-test reported a stale id; the click lands inside the
        // selection bounds, so the bounds handler starts a drag instead.
        let claimed = sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape("gone".to_string()));
        assert!(claimed);
        assert!(sm.in_session());
    }

    #[test]
    fn test_pan_scales_by_inverse_zoom() {
        let mut sm = StateManager::default();
        sm.page_state_mut().camera.zoom = 2.0;
        sm.on_pan(Vec2::new(20.0, 0.0), Point::new(100.0, 100.0));
        assert!((sm.page_state().camera.point.x + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_dispatch_keeps_cursor_anchor() {
        let mut sm = StateManager::default();
        let anchor_screen = Point::new(320.0, 240.0);
        let anchor_canvas = sm.screen_to_canvas(anchor_screen);

        sm.on_zoom(Vec2::new(0.0, -50.0), anchor_screen);

        assert!(sm.page_state().camera.zoom > 1.0);
        let after = sm.screen_to_canvas(anchor_screen);
        assert!((after.x - anchor_canvas.x).abs() < 1e-9);
        assert!((after.y - anchor_canvas.y).abs() < 1e-9);
    }

    #[test]
    fn test_rect_tool_drag_creates_rectangle() {
        let mut sm = StateManager::default();
        sm.set_tool(ToolType::Rect);

        sm.on_pointer_down(&pointer(1, 10.0, 10.0, 0.0), Target::Canvas);
        sm.on_pointer_move(&pointer(1, 110.0, 60.0, 16.0), Target::Canvas);
        sm.on_pointer_up(&pointer(1, 110.0, 60.0, 32.0), Target::Canvas);

        assert_eq!(sm.tool(), ToolType::Select);
        let id = sm.page_state().selected_id.clone().expect("shape selected");
        let Some(Shape::Rectangle(rect)) = sm.page().get_shape(&id) else {
            panic!("expected a rectangle");
        };
        assert_eq!(rect.point, Point::new(10.0, 10.0));
        assert_eq!(rect.size, [100.0, 50.0]);
    }

    #[test]
    fn test_line_tool_reverts_to_select() {
        let mut sm = StateManager::default();
        sm.set_tool(ToolType::Line);

        sm.on_pointer_down(&pointer(1, 0.0, 0.0, 0.0), Target::Canvas);
        sm.on_pointer_move(&pointer(1, 40.0, 30.0, 16.0), Target::Canvas);
        sm.on_pointer_up(&pointer(1, 40.0, 30.0, 32.0), Target::Canvas);

        assert_eq!(sm.tool(), ToolType::Select);
        assert!(sm.selected_shape().is_some());
        assert!(matches!(sm.selected_shape(), Some(Shape::Line(_))));
    }

    #[test]
    fn test_handle_session_via_handle_target() {
        let mut sm = StateManager::default();
        sm.set_tool(ToolType::Line);
        sm.on_pointer_down(&pointer(1, 100.0, 100.0, 0.0), Target::Canvas);
        sm.on_pointer_move(&pointer(1, 140.0, 100.0, 16.0), Target::Canvas);
        sm.on_pointer_up(&pointer(1, 140.0, 100.0, 32.0), Target::Canvas);
        let id = sm.page_state().selected_id.clone().unwrap();

        // Now grab the end handle with the select tool
        sm.on_pointer_down(&pointer(1, 140.0, 100.0, 500.0), Target::Handle(HandleKey::End));
        assert!(sm.in_session());
        sm.on_pointer_move(&pointer(1, 160.0, 100.0, 516.0), Target::Handle(HandleKey::End));
        sm.on_pointer_up(&pointer(1, 160.0, 100.0, 532.0), Target::Handle(HandleKey::End));

        let end = sm.page().get_shape(&id).unwrap().handles().unwrap().end.point;
        assert!(end.x > 40.0);
    }

    #[test]
    fn test_unknown_shape_type_rejected() {
        let mut sm = StateManager::default();
        let record = serde_json::json!({
            "type": "hexagon",
            "id": "h1",
            "point": { "x": 0.0, "y": 0.0 }
        });
        match sm.create_shape(record) {
            Err(StateError::UnknownShapeType(tag)) => assert_eq!(tag, "hexagon"),
            other => panic!("expected unknown shape type, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_unknown_tag() {
        let mut sm = StateManager::default();
        let doc = serde_json::json!({
            "page": {
                "id": "page",
                "canvas": { "size": [0.0, 0.0] },
                "shapes": {
                    "x": { "type": "hexagon", "id": "x", "point": { "x": 0.0, "y": 0.0 } }
                }
            }
        });
        assert!(matches!(
            sm.load_document(doc),
            Err(StateError::UnknownShapeType(_))
        ));
    }

    #[test]
    fn test_export_load_round_trip() {
        let mut sm = StateManager::default();
        add_rect(&mut sm, 5.0, 5.0, 20.0, 20.0);
        sm.page_state_mut().camera.zoom = 1.5;

        let value = serde_json::to_value(sm.export()).expect("serialize");

        let mut other = StateManager::default();
        other.load_document(value).expect("load");
        assert_eq!(other.page(), sm.page());
        assert!((other.page_state().camera.zoom - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_styles_targets_selection_or_defaults() {
        let mut sm = StateManager::default();
        let patch = StyleRecord {
            color: Some("#e8590c".to_string()),
            fill: None,
            size: Some(SizeStyle::L),
        };

        // Nothing selected: defaults change
        sm.set_styles(&patch);
        assert_eq!(sm.current_styles().color.as_deref(), Some("#e8590c"));

        let id = add_rect(&mut sm, 0.0, 0.0, 10.0, 10.0);
        sm.select_shape(Some(id.clone()));
        sm.set_styles(&StyleRecord {
            color: Some("#5f3dc4".to_string()),
            ..Default::default()
        });
        assert_eq!(
            sm.page().get_shape(&id).unwrap().styles().color.as_deref(),
            Some("#5f3dc4")
        );
    }

    #[test]
    fn test_center_camera_is_one_shot() {
        let mut sm = StateManager::default();
        sm.page_mut().canvas.size = [400.0, 300.0];
        let viewport = Bounds::new(0.0, 0.0, 800.0, 600.0);

        sm.center_camera_once(viewport);
        let centered = sm.page_state().camera.point;
        assert!((centered.x - 200.0).abs() < 1e-9);
        assert!((centered.y - 150.0).abs() < 1e-9);

        sm.page_state_mut().camera.point = Vec2::ZERO;
        sm.center_camera_once(viewport);
        assert_eq!(sm.page_state().camera.point, Vec2::ZERO);

        // Loading a document re-arms the centering
        sm.set_data(Document::default());
        sm.page_mut().canvas.size = [400.0, 300.0];
        sm.center_camera_once(viewport);
        assert!((sm.page_state().camera.point.x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_background_image_replaces_previous() {
        let mut sm = StateManager::default();
        let first = sm.set_background_image("plan-a.png".to_string(), [800.0, 600.0], None);
        let second = sm.set_background_image(
            "plan-b.png".to_string(),
            [400.0, 400.0],
            Some(BgImageScale {
                unit: "m".to_string(),
                ratio: 0.1,
            }),
        );

        assert!(sm.page().get_shape(&first).is_none());
        let shape = sm.page().get_shape(&second).expect("background present");
        assert!(shape.is_background_image());
        assert_eq!(sm.page().canvas.src.as_deref(), Some("plan-b.png"));
        assert!((sm.scale_ratio() - 0.1).abs() < f64::EPSILON);

        // Background stacks below everything else
        let bg_index = shape.child_index();
        let other = add_rect(&mut sm, 0.0, 0.0, 10.0, 10.0);
        assert!(bg_index < sm.page().get_shape(&other).unwrap().child_index());

        sm.remove_background_image();
        assert!(sm.page().background_image().is_none());
    }

    #[test]
    fn test_double_click_shape_enters_editing() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);

        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id.clone()));
        sm.on_pointer_up(&pointer(1, 50.0, 50.0, 20.0), Target::Shape(id.clone()));

        // The first release of the pair is an ordinary click
        assert!(sm.page_state().editing_id.is_none());

        sm.on_pointer_down(&pointer(1, 51.0, 50.0, 120.0), Target::Shape(id.clone()));
        sm.on_pointer_up(&pointer(1, 51.0, 50.0, 140.0), Target::Shape(id.clone()));

        assert_eq!(sm.page_state().editing_id.as_deref(), Some(id.as_str()));
        assert!(!sm.in_session());
    }

    #[test]
    fn test_alt_click_pair_does_not_enter_editing() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);

        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id.clone()));
        sm.on_pointer_up(&pointer(1, 50.0, 50.0, 20.0), Target::Shape(id.clone()));

        let mut down = pointer(1, 51.0, 50.0, 120.0);
        down.modifiers.alt = true;
        let mut up = pointer(1, 51.0, 50.0, 140.0);
        up.modifiers.alt = true;
        sm.on_pointer_down(&down, Target::Shape(id.clone()));
        sm.on_pointer_up(&up, Target::Shape(id.clone()));

        assert!(sm.page_state().editing_id.is_none());
    }

    #[test]
    fn test_click_through_drags_selected_shape() {
        let mut sm = StateManager::default();
        let outer = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);
        let inner = add_rect(&mut sm, 40.0, 40.0, 10.0, 10.0);
        sm.select_shape(Some(outer.clone()));

        // A click on a non-selected shape inside the selection bounds grabs
        // the selected shape, not the shape under the cursor
        sm.on_pointer_down(&pointer(1, 45.0, 45.0, 0.0), Target::Shape(inner.clone()));
        assert!(sm.in_session());
        assert_eq!(sm.page_state().selected_id.as_deref(), Some(outer.as_str()));

        sm.on_pointer_move(&pointer(1, 65.0, 45.0, 16.0), Target::Shape(inner.clone()));
        assert_eq!(sm.page().get_shape(&outer).unwrap().point(), Point::new(20.0, 0.0));
        assert_eq!(sm.page().get_shape(&inner).unwrap().point(), Point::new(40.0, 40.0));
    }

    #[test]
    fn test_delete_key_ignored_during_session() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);

        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id.clone()));
        sm.on_pointer_move(&pointer(1, 70.0, 50.0, 16.0), Target::Shape(id.clone()));

        assert!(!sm.on_key_down(&key("Delete")));
        assert!(sm.in_session());
        assert!(sm.page().get_shape(&id).is_some());

        // Once the gesture completes, delete works again
        sm.on_pointer_up(&pointer(1, 70.0, 50.0, 32.0), Target::Shape(id.clone()));
        assert!(sm.on_key_down(&key("Delete")));
        assert!(sm.page().get_shape(&id).is_none());
    }

    #[test]
    fn test_camera_locked_during_session() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);
        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id));
        let camera = sm.page_state().camera.clone();

        assert!(!sm.on_pan(Vec2::new(20.0, 0.0), Point::new(100.0, 100.0)));
        assert!(!sm.on_zoom(Vec2::new(0.0, -50.0), Point::new(100.0, 100.0)));
        assert_eq!(sm.page_state().camera, camera);
    }

    #[test]
    fn test_hover_tracking() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 10.0, 10.0);

        sm.on_pointer_enter(&pointer(1, 5.0, 5.0, 0.0), Target::Shape(id.clone()));
        assert_eq!(sm.page_state().hovered_id.as_deref(), Some(id.as_str()));

        sm.on_pointer_enter(&pointer(1, 500.0, 500.0, 16.0), Target::Canvas);
        assert!(sm.page_state().hovered_id.is_none());

        // Hover reporting does not lock out other pointers
        assert!(sm.on_pointer_down(&pointer(2, 500.0, 500.0, 32.0), Target::Canvas));
    }

    #[test]
    fn test_escape_completes_session_in_place() {
        let mut sm = StateManager::default();
        let id = add_rect(&mut sm, 0.0, 0.0, 100.0, 100.0);

        sm.on_pointer_down(&pointer(1, 50.0, 50.0, 0.0), Target::Shape(id.clone()));
        sm.on_pointer_move(&pointer(1, 70.0, 50.0, 16.0), Target::Shape(id.clone()));
        sm.on_key_down(&key("Escape"));

        assert!(!sm.in_session());
        // No rollback: the intermediate translation stays committed
        assert_eq!(sm.page().get_shape(&id).unwrap().point(), Point::new(20.0, 0.0));
    }
}
