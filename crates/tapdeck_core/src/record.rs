//! In-memory sink that records every injected action
//!
//! Used by tests and by embedders that want to inspect the action stream
//! before forwarding it. Pointer position and button state are tracked so
//! queries behave like a real display server.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::binding::PointerButton;
use crate::gamepad::GamepadState;
use crate::geometry::Point;
use crate::keycode::KeyCode;
use crate::sink::{DispatchSink, RelativeMouseEvent};

/// One recorded sink call
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Key { key: KeyCode, pressed: bool },
    PointerButton { button: PointerButton, pressed: bool },
    PointerMove { x: i32, y: i32 },
    PointerDelta { dx: i32, dy: i32 },
    Relative(RelativeMouseEvent),
    Gamepad(GamepadState),
}

#[derive(Default)]
struct Recorded {
    events: Vec<SinkEvent>,
    position: (i32, i32),
    buttons: FxHashSet<u8>,
    gamepad: GamepadState,
    gamepad_notifications: usize,
}

/// Thread-safe recording [`DispatchSink`]
#[derive(Default)]
pub struct RecordingSink {
    inner: Mutex<Recorded>,
    relative: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that reports relative-mouse mode
    pub fn relative() -> Self {
        let sink = Self::default();
        sink.set_relative(true);
        sink
    }

    pub fn set_relative(&self, relative: bool) {
        self.relative.store(relative, Ordering::Relaxed);
    }

    /// Place the tracked pointer without recording an event
    pub fn set_position(&self, x: i32, y: i32) {
        self.inner.lock().position = (x, y);
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<SinkEvent> {
        self.inner.lock().events.clone()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.inner.lock().events)
    }

    pub fn clear(&self) {
        self.inner.lock().events.clear();
    }

    /// Recorded key transitions only
    pub fn key_events(&self) -> Vec<(KeyCode, bool)> {
        self.inner
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Key { key, pressed } => Some((*key, *pressed)),
                _ => None,
            })
            .collect()
    }

    /// Recorded pointer button transitions, from either injection path
    pub fn button_events(&self) -> Vec<(PointerButton, bool)> {
        self.inner
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::PointerButton { button, pressed } => Some((*button, *pressed)),
                SinkEvent::Relative(RelativeMouseEvent::Button { button, pressed }) => {
                    Some((*button, *pressed))
                }
                _ => None,
            })
            .collect()
    }

    /// Sum of all relative pointer deltas, from either injection path
    pub fn total_delta(&self) -> (i32, i32) {
        self.inner
            .lock()
            .events
            .iter()
            .fold((0, 0), |(x, y), e| match e {
                SinkEvent::PointerDelta { dx, dy }
                | SinkEvent::Relative(RelativeMouseEvent::Move { dx, dy }) => (x + dx, y + dy),
                _ => (x, y),
            })
    }

    /// Last gamepad state pushed by the dispatcher
    pub fn gamepad(&self) -> GamepadState {
        self.inner.lock().gamepad
    }

    pub fn gamepad_notifications(&self) -> usize {
        self.inner.lock().gamepad_notifications
    }

    fn record(&self, event: SinkEvent) {
        tracing::trace!(?event, "sink");
        self.inner.lock().events.push(event);
    }
}

impl DispatchSink for RecordingSink {
    fn inject_key(&self, key: KeyCode, pressed: bool) {
        self.record(SinkEvent::Key { key, pressed });
    }

    fn inject_pointer_button(&self, button: PointerButton, pressed: bool) {
        {
            let mut inner = self.inner.lock();
            if pressed {
                inner.buttons.insert(button.code());
            } else {
                inner.buttons.remove(&button.code());
            }
        }
        self.record(SinkEvent::PointerButton { button, pressed });
    }

    fn inject_pointer_move(&self, x: i32, y: i32) {
        self.inner.lock().position = (x, y);
        self.record(SinkEvent::PointerMove { x, y });
    }

    fn inject_pointer_move_delta(&self, dx: i32, dy: i32) {
        {
            let mut inner = self.inner.lock();
            inner.position.0 += dx;
            inner.position.1 += dy;
        }
        self.record(SinkEvent::PointerDelta { dx, dy });
    }

    fn is_relative_mouse_movement(&self) -> bool {
        self.relative.load(Ordering::Relaxed)
    }

    fn send_relative_mouse(&self, event: RelativeMouseEvent) {
        {
            let mut inner = self.inner.lock();
            match event {
                RelativeMouseEvent::Move { dx, dy } => {
                    inner.position.0 += dx;
                    inner.position.1 += dy;
                }
                RelativeMouseEvent::Position { x, y } => inner.position = (x, y),
                RelativeMouseEvent::Button { button, pressed } => {
                    if pressed {
                        inner.buttons.insert(button.code());
                    } else {
                        inner.buttons.remove(&button.code());
                    }
                }
                RelativeMouseEvent::Wheel { .. } => {}
            }
        }
        self.record(SinkEvent::Relative(event));
    }

    fn pointer_position(&self) -> Point {
        let (x, y) = self.inner.lock().position;
        Point::new(x as f32, y as f32)
    }

    fn is_pointer_button_pressed(&self, button: PointerButton) -> bool {
        self.inner.lock().buttons.contains(&button.code())
    }

    fn set_gamepad_state(&self, state: &GamepadState) {
        self.inner.lock().gamepad = *state;
        self.record(SinkEvent::Gamepad(*state));
    }

    fn gamepad_state_changed(&self) {
        self.inner.lock().gamepad_notifications += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absolute_paths() {
        let sink = RecordingSink::new();
        sink.move_pointer_to(10, 20);
        sink.click(PointerButton::Left);
        sink.pointer_delta(5, -5);

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::PointerMove { x: 10, y: 20 },
                SinkEvent::PointerButton {
                    button: PointerButton::Left,
                    pressed: true
                },
                SinkEvent::PointerButton {
                    button: PointerButton::Left,
                    pressed: false
                },
                SinkEvent::PointerDelta { dx: 5, dy: -5 },
            ]
        );
        assert_eq!(sink.pointer_position(), Point::new(15.0, 15.0));
    }

    #[test]
    fn test_relative_paths() {
        let sink = RecordingSink::relative();
        sink.pointer_button(PointerButton::Right, true);
        assert!(sink.is_pointer_button_pressed(PointerButton::Right));
        sink.pointer_delta(3, 4);

        assert_eq!(
            sink.take(),
            vec![
                SinkEvent::Relative(RelativeMouseEvent::Button {
                    button: PointerButton::Right,
                    pressed: true
                }),
                SinkEvent::Relative(RelativeMouseEvent::Move { dx: 3, dy: 4 }),
            ]
        );
        assert!(sink.events().is_empty());
    }
}
