//! Shape creation tools: rectangle, lines and text.
//!
//! Each drag-to-create tool adds the shape immediately on pointer-down and
//! lets a session grow it live; when the gesture completes the editor
//! reverts to the select tool with the new shape selected.

use crate::geometry::snap_to_grid;
use crate::inputs::PointerInfo;
use crate::shapes::{
    HandleKey, LineShape, MeasureLineShape, RectShape, Shape, ShapePatch, TextShape,
};
use crate::state_manager::StateManager;
use crate::tools::select::HandleSession;
use crate::tools::{Callbacks, ToolType};
use kurbo::Point;

fn revert_to_select(id: String) -> Box<dyn FnOnce(&mut StateManager)> {
    Box::new(move |sm: &mut StateManager| {
        sm.set_tool(ToolType::Select);
        sm.select_shape(Some(id));
    })
}

/// Drag-to-create rectangle tool.
pub struct RectTool;

impl Callbacks for RectTool {
    fn on_point_canvas(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let grid = sm.page_state().settings.grid_factor();
        let styles = sm.page_state().settings.styles.clone();
        let point = snap_to_grid(info.point, grid);
        let rect = RectShape::new(point, [1.0, 1.0], sm.page().next_child_index(), &styles);
        let id = rect.id.clone();

        sm.page_mut().add_shape(Shape::Rectangle(rect));
        sm.start_session(
            Box::new(DrawRectSession::new(id.clone(), point)),
            Some(revert_to_select(id)),
        );
        true
    }
}

/// Grows the rectangle between the down point and the pointer.
pub struct DrawRectSession {
    id: String,
    origin: Point,
}

impl DrawRectSession {
    pub fn new(id: String, origin: Point) -> Self {
        Self { id, origin }
    }
}

impl Callbacks for DrawRectSession {
    fn on_pointer_move(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let grid = sm.page_state().settings.grid_factor();
        let Some(Shape::Rectangle(rect)) = sm.page().get_shape(&self.id) else {
            sm.complete_session();
            return false;
        };

        let cursor = snap_to_grid(info.point, grid);
        let point = Point::new(self.origin.x.min(cursor.x), self.origin.y.min(cursor.y));
        let size = [
            (cursor.x - self.origin.x).abs().max(1.0),
            (cursor.y - self.origin.y).abs().max(1.0),
        ];
        let next = Shape::Rectangle(rect.with_size(size)).apply(&ShapePatch {
            point: Some(point),
            ..Default::default()
        });
        sm.page_mut().update_shape(next);
        true
    }

    fn on_pointer_up(&mut self, sm: &mut StateManager, _info: &PointerInfo) -> bool {
        sm.complete_session();
        true
    }
}

/// Drag-to-create line tool: the session drags the end handle.
pub struct LineTool;

impl Callbacks for LineTool {
    fn on_point_canvas(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let grid = sm.page_state().settings.grid_factor();
        let styles = sm.page_state().settings.styles.clone();
        let point = snap_to_grid(info.point, grid);
        let line = LineShape::new(point, sm.page().next_child_index(), &styles);
        let id = line.id.clone();

        sm.page_mut().add_shape(Shape::Line(line));
        sm.start_session(
            Box::new(HandleSession::new(id.clone(), HandleKey::End)),
            Some(revert_to_select(id)),
        );
        true
    }
}

/// Same gesture as [`LineTool`], producing a measuring line.
pub struct MeasureLineTool;

impl Callbacks for MeasureLineTool {
    fn on_point_canvas(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let grid = sm.page_state().settings.grid_factor();
        let styles = sm.page_state().settings.styles.clone();
        let point = snap_to_grid(info.point, grid);
        let line = MeasureLineShape::new(point, sm.page().next_child_index(), &styles);
        let id = line.id.clone();

        sm.page_mut().add_shape(Shape::MeasureLine(line));
        sm.start_session(
            Box::new(HandleSession::new(id.clone(), HandleKey::End)),
            Some(revert_to_select(id)),
        );
        true
    }
}

/// Places an empty text label and opens it for editing. No session: the
/// gesture is complete on pointer-down.
pub struct TextTool;

impl Callbacks for TextTool {
    fn on_point_canvas(&mut self, sm: &mut StateManager, info: &PointerInfo) -> bool {
        let grid = sm.page_state().settings.grid_factor();
        let styles = sm.page_state().settings.styles.clone();
        let point = snap_to_grid(info.point, grid);
        let label = TextShape::new(point, String::new(), sm.page().next_child_index(), &styles);
        let id = label.id.clone();

        sm.page_mut().add_shape(Shape::Text(label));
        sm.set_tool(ToolType::Select);
        sm.select_shape(Some(id.clone()));
        sm.page_state_mut().editing_id = Some(id);
        true
    }
}
