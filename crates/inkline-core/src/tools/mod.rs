//! Tools and sessions: the two-level gesture state machine.
//!
//! A tool is the stateless idle handler for a gesture start; a session is an
//! in-progress gesture holding transient state until it completes. Both speak
//! the same [`Callbacks`] vocabulary, and the state manager routes every
//! event to the active session before consulting the tool.

mod create;
mod free_draw;
mod select;

pub use create::{LineTool, MeasureLineTool, RectTool, TextTool};
pub use free_draw::{FreeDrawSession, FreeDrawTool};
pub use select::{HandleSession, SelectTool, TranslateSession};

use crate::inputs::{KeyboardInfo, PointerInfo};
use crate::shapes::HandleKey;
use crate::state_manager::StateManager;

/// The registered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolType {
    #[default]
    Select,
    Rect,
    Line,
    MeasureLine,
    FreeDraw,
    Text,
}

/// Named event callbacks shared by tools and sessions.
///
/// Every method returns whether the event was claimed; a claimed event is
/// not routed to any further handler. All defaults are no-ops: the idle
/// behavior every tool shares (delete-selected, camera pan/zoom) is a
/// dispatch fallback for unclaimed events, applied only while no session
/// is running.
#[allow(unused_variables)]
pub trait Callbacks {
    fn on_pointer_down(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_pointer_move(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_pointer_up(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_point_canvas(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_double_click_canvas(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_point_shape(&mut self, sm: &mut StateManager, id: &str, info: &PointerInfo) -> bool {
        false
    }

    fn on_double_click_shape(&mut self, sm: &mut StateManager, id: &str, info: &PointerInfo) -> bool {
        false
    }

    fn on_point_bounds(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_point_handle(&mut self, sm: &mut StateManager, key: HandleKey, info: &PointerInfo) -> bool {
        false
    }

    fn on_pan(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_zoom(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        false
    }

    fn on_key_down(&mut self, sm: &mut StateManager, info: &KeyboardInfo) -> bool {
        false
    }

    fn on_key_up(&mut self, sm: &mut StateManager, info: &KeyboardInfo) -> bool {
        false
    }
}

/// A fresh handler for a tool. Tools are stateless between gestures, so one
/// is built per dispatch.
pub(crate) fn tool_handler(tool: ToolType) -> Box<dyn Callbacks> {
    match tool {
        ToolType::Select => Box::new(SelectTool),
        ToolType::Rect => Box::new(RectTool),
        ToolType::Line => Box::new(LineTool),
        ToolType::MeasureLine => Box::new(MeasureLineTool),
        ToolType::FreeDraw => Box::new(FreeDrawTool),
        ToolType::Text => Box::new(TextTool),
    }
}

/// Shared key handling: Delete/Backspace removes the selected shape.
pub fn handle_base_keys(sm: &mut StateManager, info: &KeyboardInfo) -> bool {
    match info.key.as_str() {
        "Delete" | "Backspace" => {
            sm.delete_selected();
            true
        }
        _ => false,
    }
}

/// Translate the camera by a screen-space delta scaled by inverse zoom.
pub fn pan_camera(sm: &mut StateManager, info: &PointerInfo) {
    let zoom = sm.page_state().camera.zoom;
    sm.page_state_mut().pan(info.delta / zoom);
}

/// Adjust zoom anchored at the screen point under the cursor. The wheel
/// delta's vertical component maps to a relative zoom change.
pub fn zoom_camera(sm: &mut StateManager, info: &PointerInfo) {
    let zoom = sm.page_state().camera.zoom;
    let next_zoom = zoom - (info.delta.y / 100.0) * zoom;
    sm.page_state_mut().zoom_to(info.point, next_zoom);
}
