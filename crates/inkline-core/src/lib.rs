//! Inkline Core Library
//!
//! Editing state engine for the Inkline vector-drawing canvas: the document
//! and shape model, input normalization, the tool/session state machine and
//! the camera transform. Rendering and UI layers consume snapshots from the
//! [`StateManager`] and feed raw events back into it.

pub mod camera;
pub mod document;
pub mod geometry;
pub mod inputs;
pub mod page;
pub mod page_state;
pub mod shapes;
pub mod state_manager;
pub mod tools;

pub use camera::Camera;
pub use document::Document;
pub use geometry::Bounds;
pub use inputs::{Inputs, KeyboardInfo, Platform, PointerInfo, RawKeyEvent, RawPointerEvent, Target};
pub use page::{CanvasInfo, Page};
pub use page_state::{PageState, Settings};
pub use shapes::{HandleKey, Shape, ShapeType, SizeStyle, StyleRecord};
pub use state_manager::{CallbackEvent, ShapeRegistry, StateError, StateManager};
pub use tools::{Callbacks, ToolType};
