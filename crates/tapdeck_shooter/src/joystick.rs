//! Dynamic on-screen joystick
//!
//! Spawned wherever a finger lands: the touch point becomes the center for
//! the lifetime of that pointer, and the thumb follows the finger clamped to
//! a circle.

use tapdeck_controls::element::{direction_states, stick_output, STICK_DEAD_ZONE};
use tapdeck_core::{Binding, Direction, InputHandler, Point, Vec2};
use tracing::trace;

/// Bindings in `up, right, down, left` order
pub type Quadrants = [Binding; 4];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DynamicJoystick {
    owner: Option<i32>,
    center: Point,
    current: Point,
    states: [bool; 4],
}

impl DynamicJoystick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<i32> {
        self.owner
    }

    pub fn is_owned_by(&self, pointer: i32) -> bool {
        self.owner == Some(pointer)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Thumb position, clamped to the radius of the last update
    pub fn current(&self) -> Point {
        self.current
    }

    /// Directions currently held, `up, right, down, left`
    pub fn states(&self) -> [bool; 4] {
        self.states
    }

    /// Spawn at `point` for `pointer`; first claim wins
    pub fn claim(&mut self, pointer: i32, point: Point) -> bool {
        if self.owner.is_some() {
            return false;
        }
        trace!(pointer, x = point.x, y = point.y, "joystick claimed");
        self.owner = Some(pointer);
        self.center = point;
        self.current = point;
        self.states = [false; 4];
        true
    }

    /// Follow the finger to `point`.
    ///
    /// Gamepad bindings get a fresh analog value every frame; other bindings
    /// only see press and release transitions.
    pub fn update(
        &mut self,
        point: Point,
        radius: f32,
        bindings: &Quadrants,
        handler: &mut dyn InputHandler,
    ) {
        if self.owner.is_none() || radius <= 0.0 {
            return;
        }
        let local = point.delta_from(self.center).clamp_length(radius);
        self.current = self.center.offset(local);

        let delta = Vec2::new(
            (local.x / radius).clamp(-1.0, 1.0),
            (local.y / radius).clamp(-1.0, 1.0),
        );
        let wanted = direction_states(delta, STICK_DEAD_ZONE);

        for (i, direction) in Direction::ALL.into_iter().enumerate() {
            let binding = bindings[i];
            if binding.is_gamepad() {
                let value = if direction.is_horizontal() {
                    delta.x
                } else {
                    delta.y
                };
                handler.handle_input_event(binding, true, stick_output(value));
                self.states[i] = true;
            } else if wanted[i] != self.states[i] {
                handler.handle_input_event(binding, wanted[i], 0.0);
                self.states[i] = wanted[i];
            }
        }
    }

    /// Release every held direction and give up the pointer
    pub fn release(&mut self, bindings: &Quadrants, handler: &mut dyn InputHandler) {
        if self.owner.is_none() {
            return;
        }
        for (held, binding) in self.states.iter().zip(bindings) {
            if *held {
                handler.handle_input_event(*binding, false, 0.0);
            }
        }
        *self = Self::default();
    }
}
