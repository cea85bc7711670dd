//! The boundary to the guest input backend
//!
//! A [`DispatchSink`] models the display server plus the virtual HID layer
//! that ultimately receive input. Everything upstream of it is synchronous
//! and single-threaded, except the pointer-motion timer which holds a shared
//! handle, hence the `Send + Sync` bound and `&self` receivers.

use crate::binding::{Binding, PointerButton};
use crate::gamepad::GamepadState;
use crate::geometry::Point;
use crate::keycode::KeyCode;

/// Mouse event for a guest running in relative-mouse mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RelativeMouseEvent {
    /// Relative motion
    Move { dx: i32, dy: i32 },
    /// Absolute cursor placement in guest coordinates
    Position { x: i32, y: i32 },
    Button { button: PointerButton, pressed: bool },
    /// Wheel notches, positive is away from the user
    Wheel { amount: i32 },
}

/// Receiver of resolved input actions
pub trait DispatchSink: Send + Sync {
    fn inject_key(&self, key: KeyCode, pressed: bool);

    fn inject_pointer_button(&self, button: PointerButton, pressed: bool);

    /// Absolute pointer placement in guest coordinates
    fn inject_pointer_move(&self, x: i32, y: i32);

    fn inject_pointer_move_delta(&self, dx: i32, dy: i32);

    /// Whether the guest consumes mouse input as relative events
    fn is_relative_mouse_movement(&self) -> bool {
        false
    }

    fn send_relative_mouse(&self, _event: RelativeMouseEvent) {}

    /// Current guest pointer position
    fn pointer_position(&self) -> Point;

    fn is_pointer_button_pressed(&self, button: PointerButton) -> bool;

    /// Replace the guest-visible virtual gamepad state
    fn set_gamepad_state(&self, state: &GamepadState);

    fn gamepad_state_changed(&self);

    /// Press or release a pointer button through whichever path the guest uses
    fn pointer_button(&self, button: PointerButton, pressed: bool) {
        if self.is_relative_mouse_movement() {
            self.send_relative_mouse(RelativeMouseEvent::Button { button, pressed });
        } else {
            self.inject_pointer_button(button, pressed);
        }
    }

    /// Press then release a pointer button
    fn click(&self, button: PointerButton) {
        self.pointer_button(button, true);
        self.pointer_button(button, false);
    }

    /// Relative pointer motion through whichever path the guest uses
    fn pointer_delta(&self, dx: i32, dy: i32) {
        if self.is_relative_mouse_movement() {
            self.send_relative_mouse(RelativeMouseEvent::Move { dx, dy });
        } else {
            self.inject_pointer_move_delta(dx, dy);
        }
    }

    /// Absolute cursor placement through whichever path the guest uses
    fn move_pointer_to(&self, x: i32, y: i32) {
        if self.is_relative_mouse_movement() {
            self.send_relative_mouse(RelativeMouseEvent::Position { x, y });
        } else {
            self.inject_pointer_move(x, y);
        }
    }
}

/// Consumer of binding activations.
///
/// Controls and dynamic joysticks report what they resolved through this
/// trait; the dispatcher decides whether it becomes gamepad state or direct
/// injection.
pub trait InputHandler {
    /// Activate or release `binding`. `offset` carries the analog value in
    /// `[-1, 1]` for stick and pointer-move bindings, `0.0` otherwise.
    fn handle_input_event(&mut self, binding: Binding, pressed: bool, offset: f32);

    /// Relative pointer motion, routed through the relative path if active
    fn move_pointer_by(&mut self, dx: i32, dy: i32);
}
