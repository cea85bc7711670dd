//! Gesture front-end
//!
//! Routes pointer input to the right recognizer: styluses always act as an
//! absolute pointer, fingers go to the touchpad or touchscreen recognizer
//! depending on [`InputMode`], and an external mouse drives the cursor
//! directly.

use tapdeck_core::{
    round_away_from_zero, DispatchSink, Point, PointerButton, RelativeMouseEvent, ToolType,
    TouchEvent, ViewTransform,
};
use tracing::debug;

use crate::config::TouchGestureConfig;
use crate::touchpad::{
    FourFingerTap, TouchpadRecognizer, CURSOR_ACCELERATION, CURSOR_ACCELERATION_THRESHOLD,
};
use crate::touchscreen::TouchscreenRecognizer;

/// How finger contacts drive the pointer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Relative cursor with tap-to-click
    #[default]
    Touchpad,
    /// Cursor follows the finger, with gestures
    Touchscreen,
}

/// Event from an external (non-touch) mouse
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MouseEvent {
    ButtonPress(PointerButton),
    ButtonRelease(PointerButton),
    /// Absolute hover or drag position in view space
    Move { x: f32, y: f32 },
    /// Vertical wheel; positive is away from the user
    Scroll { amount: f32 },
}

#[derive(Debug)]
pub struct GestureRecognizer {
    xform: ViewTransform,
    mode: InputMode,
    touchscreen_mouse_disabled: bool,
    sensitivity: f32,
    config: TouchGestureConfig,
    touchpad: TouchpadRecognizer,
    touchscreen: TouchscreenRecognizer,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            xform: ViewTransform::default(),
            mode: InputMode::default(),
            touchscreen_mouse_disabled: false,
            sensitivity: 1.0,
            config: TouchGestureConfig::default(),
            touchpad: TouchpadRecognizer::new(),
            touchscreen: TouchscreenRecognizer::new(),
        }
    }

    pub fn with_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_config(mut self, config: TouchGestureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch modes, releasing whatever the outgoing gesture holds
    pub fn set_mode(&mut self, mode: InputMode, sink: &dyn DispatchSink) {
        if mode != self.mode {
            debug!(?mode, "input mode");
            self.cancel(sink);
            self.mode = mode;
        }
    }

    pub fn config(&self) -> &TouchGestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TouchGestureConfig) {
        self.config = config;
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.xform
    }

    pub fn set_transform(&mut self, xform: ViewTransform) {
        self.xform = xform;
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
        self.touchpad.set_sensitivity(sensitivity);
    }

    /// When set, finger touches are swallowed; stylus and mouse still work
    pub fn set_touchscreen_mouse_disabled(&mut self, disabled: bool) {
        self.touchscreen_mouse_disabled = disabled;
    }

    pub fn touchpad_mut(&mut self) -> &mut TouchpadRecognizer {
        &mut self.touchpad
    }

    pub fn touchscreen(&self) -> &TouchscreenRecognizer {
        &self.touchscreen
    }

    pub fn set_four_finger_tap(&mut self, callback: Option<FourFingerTap>) {
        self.touchpad.set_four_finger_tap(callback);
    }

    /// Handle one touch event. Always consumes it.
    pub fn handle_touch(&mut self, event: &TouchEvent, sink: &dyn DispatchSink) -> bool {
        let tool = event.tool();
        if self.touchscreen_mouse_disabled && tool == ToolType::Finger {
            return true;
        }
        if tool == ToolType::Stylus {
            self.handle_stylus(event, sink);
            return true;
        }
        match self.mode {
            InputMode::Touchpad => self.touchpad.handle(event, &self.xform, sink),
            InputMode::Touchscreen => {
                self.touchscreen
                    .handle(event, &self.config, &self.xform, sink)
            }
        }
        true
    }

    fn handle_stylus(&self, event: &TouchEvent, sink: &dyn DispatchSink) {
        match event {
            TouchEvent::Down { pointer, .. } => {
                let (x, y) = self.xform.apply_int(pointer.position());
                sink.inject_pointer_move(x, y);
                let button = if pointer.secondary_button {
                    PointerButton::Right
                } else {
                    PointerButton::Left
                };
                sink.inject_pointer_button(button, true);
            }
            TouchEvent::Move { pointers, .. } => {
                if let Some(pointer) = pointers.first() {
                    let (x, y) = self.xform.apply_int(pointer.position());
                    sink.inject_pointer_move(x, y);
                }
            }
            TouchEvent::Up { .. } => {
                sink.inject_pointer_button(PointerButton::Left, false);
                sink.inject_pointer_button(PointerButton::Right, false);
            }
            TouchEvent::Cancel { .. } => {}
        }
    }

    /// Handle an external mouse event
    pub fn handle_mouse(&self, event: MouseEvent, sink: &dyn DispatchSink) -> bool {
        match event {
            MouseEvent::ButtonPress(button) => sink.pointer_button(button, true),
            MouseEvent::ButtonRelease(button) => sink.pointer_button(button, false),
            MouseEvent::Move { x, y } => {
                let (x, y) = self.xform.apply_int(Point::new(x, y));
                sink.move_pointer_to(x, y);
            }
            MouseEvent::Scroll { amount } => {
                let button = if amount <= -1.0 {
                    PointerButton::ScrollDown
                } else if amount >= 1.0 {
                    PointerButton::ScrollUp
                } else {
                    return true;
                };
                if sink.is_relative_mouse_movement() {
                    sink.send_relative_mouse(RelativeMouseEvent::Wheel {
                        amount: amount as i32,
                    });
                } else {
                    sink.inject_pointer_button(button, true);
                    sink.inject_pointer_button(button, false);
                }
            }
        }
        true
    }

    /// Relative motion from a captured mouse, in device counts
    pub fn handle_captured_delta(&self, dx: f32, dy: f32, sink: &dyn DispatchSink) {
        let accelerate = |d: f32| {
            let d = d * self.sensitivity;
            if d.abs() > CURSOR_ACCELERATION_THRESHOLD {
                d * CURSOR_ACCELERATION
            } else {
                d
            }
        };
        sink.inject_pointer_move_delta(
            round_away_from_zero(accelerate(dx)),
            round_away_from_zero(accelerate(dy)),
        );
    }

    /// Fire due timers: touchscreen long-press and touchpad button releases
    pub fn poll(&mut self, now_ms: u64, sink: &dyn DispatchSink) {
        self.touchscreen.poll(now_ms, &self.config, sink);
        self.touchpad.poll(now_ms, sink);
    }

    /// Drop any in-flight gesture, releasing what it holds
    pub fn cancel(&mut self, sink: &dyn DispatchSink) {
        self.touchscreen.cancel(sink);
        self.touchpad.reset();
    }
}
