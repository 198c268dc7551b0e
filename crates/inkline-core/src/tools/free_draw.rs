//! Freehand drawing tool.

use crate::inputs::{KeyboardInfo, PointerInfo};
use crate::shapes::{FreeDrawShape, Shape};
use crate::state_manager::StateManager;
use crate::tools::Callbacks;

/// Starts a stroke on pointer-down anywhere on the canvas. The tool stays
/// active after each stroke so several can be drawn in a row.
pub struct FreeDrawTool;

impl Callbacks for FreeDrawTool {
    fn on_pointer_down(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let styles = sm.page_state().settings.styles.clone();
        let child_index = sm.page().next_child_index();
        let stroke = FreeDrawShape::new(info.point, child_index, &styles);
        let id = stroke.id.clone();

        sm.page_mut().add_shape(Shape::FreeDraw(stroke));
        sm.start_session(Box::new(FreeDrawSession::new(id)), None);
        true
    }
}

/// Appends a point to the stroke on every move; on pointer-up the stroke is
/// re-anchored to its top-left corner and the session completes.
pub struct FreeDrawSession {
    id: String,
}

impl FreeDrawSession {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

impl Callbacks for FreeDrawSession {
    fn on_pointer_move(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let Some(Shape::FreeDraw(stroke)) = sm.page().get_shape(&self.id) else {
            sm.complete_session();
            return false;
        };
        let next = stroke.with_point(info.point);
        sm.page_mut().update_shape(Shape::FreeDraw(next));
        true
    }

    fn on_pointer_up(&mut self, sm: &mut StateManager, _info: &PointerInfo) -> bool {
        if let Some(Shape::FreeDraw(stroke)) = sm.page().get_shape(&self.id) {
            let finished = stroke.normalized();
            sm.page_mut().update_shape(Shape::FreeDraw(finished));
        }
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
