//! Pointer input tracking: pressed buttons, drags and double clicks.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: Vec2 },
}

/// Max distance between two clicks of a double click, in screen pixels.
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks the pointer between events.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    pub modifiers: Modifiers,
    /// Where the current left-button press started.
    pub drag_start: Option<Point>,
    double_click_window: Duration,
    last_click: Option<(Instant, Point)>,
    double_click_detected: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(500)
    }
}

impl InputState {
    /// Create input tracking with a double-click window in milliseconds.
    /// A zero window disables double clicks.
    pub fn new(double_click_ms: u64) -> Self {
        Self {
            pointer_position: Point::ZERO,
            pressed_buttons: HashSet::new(),
            modifiers: Modifiers::default(),
            drag_start: None,
            double_click_window: Duration::from_millis(double_click_ms),
            last_click: None,
            double_click_detected: false,
        }
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.handle_pointer_event_at(event, Instant::now());
    }

    /// Process a pointer event that happened at `now`.
    pub fn handle_pointer_event_at(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.insert(button);
                self.double_click_detected = false;
                if button == MouseButton::Left {
                    self.detect_double_click(position, now);
                    self.drag_start = Some(position);
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.remove(&button);
                if button == MouseButton::Left {
                    self.drag_start = None;
                }
            }
            PointerEvent::Move { position } | PointerEvent::Scroll { position, .. } => {
                self.pointer_position = position;
            }
        }
    }

    fn detect_double_click(&mut self, position: Point, now: Instant) {
        if self.double_click_window.is_zero() {
            return;
        }
        let is_double = self.last_click.is_some_and(|(time, last)| {
            now.saturating_duration_since(time) < self.double_click_window
                && last.distance(position) < DOUBLE_CLICK_DISTANCE
        });
        if is_double {
            self.double_click_detected = true;
            // A third click starts over rather than chaining.
            self.last_click = None;
        } else {
            self.last_click = Some((now, position));
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Whether the most recent press completed a double click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }

    /// Get the drag delta from start position, if dragging.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(position: Point) -> PointerEvent {
        PointerEvent::Down {
            position,
            button: MouseButton::Left,
        }
    }

    fn up(position: Point) -> PointerEvent {
        PointerEvent::Up {
            position,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_drag_tracking() {
        let mut input = InputState::default();
        input.handle_pointer_event(down(Point::new(100.0, 100.0)));
        assert!(input.is_button_pressed(MouseButton::Left));
        input.handle_pointer_event(PointerEvent::Move {
            position: Point::new(150.0, 120.0),
        });
        assert_eq!(input.drag_delta(), Some(Vec2::new(50.0, 20.0)));
        input.handle_pointer_event(up(Point::new(150.0, 120.0)));
        assert!(input.drag_delta().is_none());
        assert!(!input.is_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_double_click_within_window() {
        let mut input = InputState::new(500);
        let t0 = Instant::now();
        let pos = Point::new(10.0, 10.0);
        input.handle_pointer_event_at(down(pos), t0);
        assert!(!input.is_double_click());
        input.handle_pointer_event_at(up(pos), t0);
        input.handle_pointer_event_at(down(pos), t0 + Duration::from_millis(200));
        assert!(input.is_double_click());
        // Third click does not chain.
        input.handle_pointer_event_at(down(pos), t0 + Duration::from_millis(300));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_double_click_too_slow_or_far() {
        let mut input = InputState::new(500);
        let t0 = Instant::now();
        input.handle_pointer_event_at(down(Point::ZERO), t0);
        input.handle_pointer_event_at(down(Point::ZERO), t0 + Duration::from_millis(600));
        assert!(!input.is_double_click());
        input.handle_pointer_event_at(down(Point::new(50.0, 0.0)), t0 + Duration::from_millis(700));
        assert!(!input.is_double_click());
    }

    #[test]
    fn test_zero_window_disables_double_click() {
        let mut input = InputState::new(0);
        let t0 = Instant::now();
        input.handle_pointer_event_at(down(Point::ZERO), t0);
        input.handle_pointer_event_at(down(Point::ZERO), t0);
        assert!(!input.is_double_click());
    }
}
