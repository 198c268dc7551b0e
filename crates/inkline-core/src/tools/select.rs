//! Select tool: selection, dragging and handle editing.

use crate::inputs::{KeyboardInfo, PointerInfo};
use crate::shapes::HandleKey;
use crate::state_manager::StateManager;
use crate::tools::Callbacks;
use kurbo::Vec2;

/// The default idle tool.
pub struct SelectTool;

impl SelectTool {
    fn start_translate(&self, sm: &mut StateManager, id: &str, info: &PointerInfo) -> bool {
        let Some(shape) = sm.page().get_shape(id) else {
            return false;
        };
        let grab = info.point - shape.point();
        let id = id.to_string();
        sm.select_shape(Some(id.clone()));
        sm.start_session(Box::new(TranslateSession::new(id, grab)), None);
        true
    }
}

impl Callbacks for SelectTool {
    fn on_point_canvas(&mut self, sm: &mut StateManager, _info: &PointerInfo) -> bool {
        sm.page_state_mut().clear_selection();
        true
    }

    fn on_point_shape(&mut self, sm: &mut StateManager, id: &str, info: &PointerInfo) -> bool {
        self.start_translate(sm, id, info)
    }

    fn on_double_click_shape(&mut self, sm: &mut StateManager, id: &str, _info: &PointerInfo) -> bool {
        if sm.page().get_shape(id).is_none() {
            return false;
        }
        sm.select_shape(Some(id.to_string()));
        sm.page_state_mut().editing_id = Some(id.to_string());
        true
    }

    fn on_point_bounds(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let Some(id) = sm.page_state().selected_id.clone() else {
            return false;
        };
        self.start_translate(sm, &id, info)
    }

    fn on_point_handle(&mut self, sm: &mut StateManager, key: HandleKey, _info: &PointerInfo) -> bool {
        let Some(id) = sm.page_state().selected_id.clone() else {
            return false;
        };
        let Some(shape) = sm.page().get_shape(&id) else {
            return false;
        };
        if shape.handles().is_none() {
            return false;
        }
        sm.start_session(Box::new(HandleSession::new(id, key)), None);
        true
    }

    fn on_key_down(&mut self, sm: &mut StateManager, info: &KeyboardInfo) -> bool {
        match info.key.as_str() {
            "Escape" => {
                sm.page_state_mut().clear_selection();
                true
            }
            _ => false,
        }
    }
}

/// Drags the grabbed shape, keeping the grab offset under the pointer.
pub struct TranslateSession {
    id: String,
    /// Canvas-space offset from the shape origin to the grab point.
    grab: Vec2,
}

impl TranslateSession {
    pub fn new(id: String, grab: Vec2) -> Self {
        Self { id, grab }
    }
}

impl Callbacks for TranslateSession {
    fn on_pointer_move(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let grid = sm.page_state().settings.grid_factor();
        let Some(shape) = sm.page().get_shape(&self.id) else {
            sm.complete_session();
            return false;
        };
        let next = shape.translate(info.point - self.grab, grid);
        sm.page_mut().update_shape(next);
        true
    }

    fn on_pointer_up(&mut self, sm: &mut StateManager, _info: &PointerInfo) -> bool {
        sm.complete_session();
        true
    }

    fn on_key_down(&mut self, sm: &mut StateManager, info: &KeyboardInfo) -> bool {
        match info.key.as_str() {
            "Escape" => {
                sm.complete_session();
                true
            }
            _ => false,
        }
    }
}

/// Drags one named handle of the selected line shape.
pub struct HandleSession {
    id: String,
    key: HandleKey,
}

impl HandleSession {
    pub fn new(id: String, key: HandleKey) -> Self {
        Self { id, key }
    }
}

impl Callbacks for HandleSession {
    fn on_pointer_move(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let zoom = sm.page_state().camera.zoom;
        let grid = sm.page_state().settings.grid_factor();
        let Some(shape) = sm.page().get_shape(&self.id) else {
            sm.complete_session();
            return false;
        };
        // Deltas arrive in screen units; scale into canvas space.
        let delta = info.delta / zoom;
        if let Some(next) = shape.move_handle(self.key, delta, info.shift_key, grid) {
            sm.page_mut().update_shape(next);
        }
        true
    }

    fn on_pointer_up(&mut self, sm: &mut StateManager, _info: &PointerInfo) -> bool {
        sm.complete_session();
        true
    }

    fn on_key_down(&mut self, sm: &mut StateManager, info: &KeyboardInfo) -> bool {
        match info.key.as_str() {
            "Escape" => {
                sm.complete_session();
                true
            }
            _ => false,
        }
    }
}
