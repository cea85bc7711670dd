//! Binding activations to sink calls
//!
//! [`InputDispatcher`] owns the virtual [`GamepadState`]. Gamepad bindings
//! mutate it and push the snapshot to the sink; pointer-move bindings feed
//! the motion timer; everything else is injected directly.

use std::sync::Arc;

use tapdeck_core::{Binding, DispatchSink, GamepadButton, GamepadState, InputHandler, Vec2};
use tracing::{debug, warn};

use crate::mouse_timer::{MotionOffset, MouseMoveTimer};

pub struct InputDispatcher {
    state: GamepadState,
    sink: Option<Arc<dyn DispatchSink>>,
    motion: Arc<MotionOffset>,
    timer: Option<MouseMoveTimer>,
    cursor_speed: f32,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDispatcher {
    /// Dispatcher without a sink; every activation is a no-op until one is set
    pub fn new() -> Self {
        Self {
            state: GamepadState::default(),
            sink: None,
            motion: Arc::new(MotionOffset::new()),
            timer: None,
            cursor_speed: 1.0,
        }
    }

    pub fn with_sink(sink: Arc<dyn DispatchSink>) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.sink = Some(sink);
        dispatcher
    }

    pub fn set_sink(&mut self, sink: Option<Arc<dyn DispatchSink>>) {
        self.stop_timer();
        self.sink = sink;
    }

    pub fn sink(&self) -> Option<&Arc<dyn DispatchSink>> {
        self.sink.as_ref()
    }

    pub fn gamepad_state(&self) -> &GamepadState {
        &self.state
    }

    pub fn cursor_speed(&self) -> f32 {
        self.cursor_speed
    }

    /// Changing speed restarts the motion timer on the next activation
    pub fn set_cursor_speed(&mut self, speed: f32) {
        if speed != self.cursor_speed {
            self.cursor_speed = speed;
            self.stop_timer();
        }
    }

    /// Current continuous pointer-motion offset
    pub fn pointer_motion(&self) -> Vec2 {
        self.motion.load()
    }

    /// Replace the pointer-motion offset as a whole.
    ///
    /// Starts the timer when the new offset is non-zero.
    pub fn set_pointer_motion(&mut self, offset: Vec2) {
        self.motion.store(offset);
        if offset != Vec2::ZERO {
            self.ensure_timer();
        }
    }

    /// Whether the motion timer thread is running
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Stop the timer and zero the motion offset
    pub fn shutdown(&mut self) {
        self.stop_timer();
        self.motion.clear();
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    fn ensure_timer(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let Some(sink) = self.sink.clone() else {
            return;
        };
        match MouseMoveTimer::spawn(Arc::clone(&self.motion), sink, self.cursor_speed) {
            Ok(timer) => self.timer = Some(timer),
            Err(err) => warn!(%err, "failed to start mouse move timer"),
        }
    }

    fn push_gamepad_state(&self) {
        if let Some(sink) = &self.sink {
            sink.set_gamepad_state(&self.state);
            sink.gamepad_state_changed();
        }
    }
}

impl InputHandler for InputDispatcher {
    fn handle_input_event(&mut self, binding: Binding, pressed: bool, offset: f32) {
        match binding {
            Binding::GamepadButton(button) => {
                self.state.set_pressed(button, pressed);
                if button.is_trigger() {
                    let value = match (pressed, offset > 0.0) {
                        (true, true) => offset,
                        (true, false) => 1.0,
                        (false, _) => 0.0,
                    };
                    self.state.set_trigger(button, value);
                }
                self.push_gamepad_state();
            }
            Binding::GamepadStick(stick, direction) => {
                let value = if pressed { offset } else { 0.0 };
                self.state
                    .set_stick_axis(stick, direction.is_horizontal(), value);
                self.push_gamepad_state();
            }
            Binding::GamepadDPad(direction) => {
                self.state.set_dpad(direction, pressed);
                self.push_gamepad_state();
            }
            Binding::PointerMove(direction) => {
                let value = if !pressed {
                    0.0
                } else if offset != 0.0 {
                    offset
                } else {
                    direction.sign()
                };
                if direction.is_horizontal() {
                    self.motion.set_x(value);
                } else {
                    self.motion.set_y(value);
                }
                if pressed {
                    self.ensure_timer();
                }
            }
            Binding::PointerButton(button) => {
                if let Some(sink) = &self.sink {
                    sink.inject_pointer_button(button, pressed);
                }
            }
            Binding::Key(key) => {
                if let Some(sink) = &self.sink {
                    sink.inject_key(key, pressed);
                }
            }
        }
    }

    fn move_pointer_by(&mut self, dx: i32, dy: i32) {
        if let Some(sink) = &self.sink {
            sink.pointer_delta(dx, dy);
        }
    }
}

impl Drop for InputDispatcher {
    fn drop(&mut self) {
        if self.timer.is_some() {
            debug!("dispatcher dropped with running mouse move timer");
        }
        self.stop_timer();
    }
}

impl std::fmt::Debug for InputDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("state", &self.state)
            .field("has_sink", &self.sink.is_some())
            .field("timer", &self.timer)
            .field("cursor_speed", &self.cursor_speed)
            .finish()
    }
}

/// Whether `binding` is one of the analog trigger buttons
pub fn is_trigger_binding(binding: Binding) -> bool {
    matches!(
        binding,
        Binding::GamepadButton(GamepadButton::L2) | Binding::GamepadButton(GamepadButton::R2)
    )
}
