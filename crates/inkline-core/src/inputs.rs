//! Input normalization for pointer, keyboard and wheel events.
//!
//! Raw hardware-level events are converted into semantic [`PointerInfo`] and
//! [`KeyboardInfo`] records with coordinates relative to the renderer bounds.
//! The normalizer also owns gesture-level bookkeeping: which pointer id is
//! allowed to drive the current gesture, and double-click detection.

use crate::geometry::{Bounds, point_to_fixed, to_fixed};
use crate::shapes::HandleKey;
use kurbo::{Point, Vec2};
use std::collections::BTreeSet;

/// Time window for double-click detection, in milliseconds.
const DOUBLE_CLICK_DURATION: f64 = 250.0;
/// Maximum distance between the up/down points of a double-click.
const DOUBLE_CLICK_DISTANCE: f64 = 4.0;

/// Pressure reported when the device provides none.
const DEFAULT_PRESSURE: f64 = 0.5;

/// Host platform, used for the meta/ctrl alias swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

/// Modifier key flags as reported by the raw event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierKeys {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Logical target of a pointer event, provided by the hit-testing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Empty canvas area.
    Canvas,
    /// A shape, by id.
    Shape(String),
    /// The selection bounds region around the selected shape.
    Bounds,
    /// A named handle on the selected shape.
    Handle(HandleKey),
    /// Synthetic target for wheel/gesture pan and zoom.
    PanZoom,
}

/// A raw pointer event as delivered by the windowing layer.
///
/// `client` is in viewport coordinates; `time` is a millisecond timestamp
/// (monotonic within a document session, e.g. DOM `event.timeStamp`).
#[derive(Debug, Clone)]
pub struct RawPointerEvent {
    pub pointer_id: u64,
    /// 0 = primary, 2 = secondary.
    pub button: u8,
    pub client: Point,
    /// Device pressure, if reported.
    pub pressure: Option<f64>,
    pub modifiers: ModifierKeys,
    pub time: f64,
}

/// A raw keyboard event.
#[derive(Debug, Clone)]
pub struct RawKeyEvent {
    pub key: String,
    pub modifiers: ModifierKeys,
    pub time: f64,
}

/// Semantic pointer record handed to tools and sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerInfo {
    pub target: Target,
    pub pointer_id: u64,
    /// First-touch location of the current gesture.
    pub origin: Point,
    /// Current location.
    pub point: Point,
    /// Movement since the previously recorded point.
    pub delta: Vec2,
    pub pressure: f64,
    pub shift_key: bool,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    pub space_key: bool,
}

/// Semantic keyboard record: the key that changed plus the full live set.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardInfo {
    pub point: Point,
    pub origin: Point,
    pub key: String,
    /// All currently depressed keys, in sorted order.
    pub keys: Vec<String>,
    pub shift_key: bool,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// The input normalizer.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Last reported pointer record.
    pub pointer: Option<PointerInfo>,
    /// Live set of depressed keys.
    keys: BTreeSet<String>,
    /// On-screen bounds of the canvas element.
    bounds: Bounds,
    /// Timestamp and location of the last pointer-up, for double-click
    /// detection. The timestamp starts at negative infinity so the very
    /// first click can never read as a double-click.
    pointer_up_time: f64,
    pointer_up_point: Point,
    /// Pointer id that owns the in-progress gesture, if any.
    active_pointer: Option<u64>,
    platform: Platform,
}

impl Default for Inputs {
    fn default() -> Self {
        Self::new(Platform::default())
    }
}

impl Inputs {
    pub fn new(platform: Platform) -> Self {
        Self {
            pointer: None,
            keys: BTreeSet::new(),
            bounds: Bounds::new(0.0, 0.0, 640.0, 480.0),
            pointer_up_time: f64::NEG_INFINITY,
            pointer_up_point: Point::ZERO,
            active_pointer: None,
            platform,
        }
    }

    /// Update the canvas's on-screen bounding rectangle.
    pub fn update_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// While a gesture has claimed an active pointer, events from any other
    /// pointer id are rejected.
    pub fn pointer_is_valid(&self, event: &RawPointerEvent) -> bool {
        match self.active_pointer {
            Some(active) => active == event.pointer_id,
            None => true,
        }
    }

    /// Release the active-pointer lock without touching other state.
    pub fn release_pointer(&mut self) {
        self.active_pointer = None;
    }

    pub fn pointer_down(&mut self, event: &RawPointerEvent, target: Target) -> PointerInfo {
        let point = self.event_point(event);
        self.active_pointer = Some(event.pointer_id);

        let info = PointerInfo {
            target,
            pointer_id: event.pointer_id,
            origin: point,
            point,
            delta: Vec2::ZERO,
            pressure: event_pressure(event),
            shift_key: event.modifiers.shift,
            ctrl_key: event.modifiers.ctrl,
            alt_key: event.modifiers.alt,
            meta_key: self.meta_key(event.modifiers),
            space_key: self.keys.contains(" "),
        };
        self.pointer = Some(info.clone());
        info
    }

    /// Like `pointer_down` but without claiming the active pointer; used for
    /// hover enter/leave reporting.
    pub fn pointer_enter(&mut self, event: &RawPointerEvent, target: Target) -> PointerInfo {
        let point = self.event_point(event);
        let info = PointerInfo {
            target,
            pointer_id: event.pointer_id,
            origin: point,
            point,
            delta: Vec2::ZERO,
            pressure: event_pressure(event),
            shift_key: event.modifiers.shift,
            ctrl_key: event.modifiers.ctrl,
            alt_key: event.modifiers.alt,
            meta_key: self.meta_key(event.modifiers),
            space_key: self.keys.contains(" "),
        };
        self.pointer = Some(info.clone());
        info
    }

    pub fn pointer_move(&mut self, event: &RawPointerEvent, target: Target) -> PointerInfo {
        let point = self.event_point(event);
        let (origin, delta) = match &self.pointer {
            Some(prev) => (prev.origin, point - prev.point),
            None => (point, Vec2::ZERO),
        };

        let info = PointerInfo {
            target,
            pointer_id: event.pointer_id,
            origin,
            point,
            delta,
            pressure: event_pressure(event),
            shift_key: event.modifiers.shift,
            ctrl_key: event.modifiers.ctrl,
            alt_key: event.modifiers.alt,
            meta_key: self.meta_key(event.modifiers),
            space_key: self.keys.contains(" "),
        };
        self.pointer = Some(info.clone());
        info
    }

    pub fn pointer_up(&mut self, event: &RawPointerEvent, target: Target) -> PointerInfo {
        let point = self.event_point(event);
        let (origin, delta) = match &self.pointer {
            Some(prev) => (prev.origin, point - prev.point),
            None => (point, Vec2::ZERO),
        };

        self.active_pointer = None;

        let info = PointerInfo {
            target,
            pointer_id: event.pointer_id,
            origin,
            point,
            delta,
            pressure: event_pressure(event),
            shift_key: event.modifiers.shift,
            ctrl_key: event.modifiers.ctrl,
            alt_key: event.modifiers.alt,
            meta_key: self.meta_key(event.modifiers),
            space_key: self.keys.contains(" "),
        };
        self.pointer = Some(info.clone());
        self.pointer_up_time = event.time;
        self.pointer_up_point = point;
        info
    }

    /// Synthesize a pointer record for wheel/gesture pan or zoom.
    ///
    /// Wheel events carry no reliable modifier flags across platforms, so
    /// modifiers come from the tracked key set instead.
    pub fn panzoom(&mut self, delta: Vec2, client: Point) -> PointerInfo {
        let point = point_to_fixed(Point::new(
            client.x - self.bounds.min_x,
            client.y - self.bounds.min_y,
        ));
        let (pointer_id, origin) = match &self.pointer {
            Some(prev) => (prev.pointer_id, prev.origin),
            None => (0, Point::ZERO),
        };

        let info = PointerInfo {
            target: Target::PanZoom,
            pointer_id,
            origin,
            point,
            delta,
            pressure: DEFAULT_PRESSURE,
            shift_key: self.keys.contains("Shift"),
            ctrl_key: self.keys.contains("Control"),
            alt_key: self.keys.contains("Alt"),
            meta_key: self.keys.contains("Meta"),
            space_key: self.keys.contains(" "),
        };
        self.pointer = Some(info.clone());
        info
    }

    /// True when the interval since the last pointer-up is under the
    /// double-click threshold and the pointer is within a few units of the
    /// last up location.
    ///
    /// Also clears the active-pointer lock when true, so a lock stuck by a
    /// missed up-event cannot block input indefinitely.
    pub fn is_double_click(&mut self, now: f64) -> bool {
        let Some(pointer) = &self.pointer else {
            return false;
        };
        let dist = (pointer.point - self.pointer_up_point).hypot();
        let is_double = now - self.pointer_up_time < DOUBLE_CLICK_DURATION
            && dist < DOUBLE_CLICK_DISTANCE;
        if is_double {
            self.active_pointer = None;
        }
        is_double
    }

    pub fn key_down(&mut self, event: &RawKeyEvent) -> KeyboardInfo {
        self.keys.insert(event.key.clone());
        self.keyboard_info(event)
    }

    pub fn key_up(&mut self, event: &RawKeyEvent) -> KeyboardInfo {
        self.keys.remove(&event.key);
        self.keyboard_info(event)
    }

    /// Clear all transient state. Called on focus loss or document swap so a
    /// stale gesture cannot leak into the next document.
    pub fn reset(&mut self) {
        self.pointer = None;
        self.keys.clear();
        self.pointer_up_time = f64::NEG_INFINITY;
        self.pointer_up_point = Point::ZERO;
        self.active_pointer = None;
    }

    fn keyboard_info(&self, event: &RawKeyEvent) -> KeyboardInfo {
        let (point, origin) = match &self.pointer {
            Some(prev) => (prev.point, prev.origin),
            None => (Point::ZERO, Point::ZERO),
        };
        KeyboardInfo {
            point,
            origin,
            key: event.key.clone(),
            keys: self.keys.iter().cloned().collect(),
            shift_key: event.modifiers.shift,
            ctrl_key: event.modifiers.ctrl,
            alt_key: event.modifiers.alt,
            meta_key: self.meta_key(event.modifiers),
        }
    }

    fn event_point(&self, event: &RawPointerEvent) -> Point {
        point_to_fixed(Point::new(
            event.client.x - self.bounds.min_x,
            event.client.y - self.bounds.min_y,
        ))
    }

    fn meta_key(&self, modifiers: ModifierKeys) -> bool {
        match self.platform {
            Platform::Mac => modifiers.meta,
            Platform::Other => modifiers.ctrl,
        }
    }
}

fn event_pressure(event: &RawPointerEvent) -> f64 {
    match event.pressure {
        Some(p) if to_fixed(p) != 0.0 => to_fixed(p),
        _ => DEFAULT_PRESSURE,
    }
}
