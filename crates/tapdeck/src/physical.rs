//! Physical controller input
//!
//! Buttons and axes of a real gamepad are looked up in the profile's
//! controller table for the reporting device (falling back to the `"*"`
//! entry) and applied through the same dispatcher as on-screen controls, so
//! both sources share one virtual gamepad.

use smallvec::SmallVec;
use tapdeck_controls::{
    is_trigger_binding, keycode_for_axis, keycodes, Axis, ControlsProfile, ExternalController,
    InputDispatcher, Resolution, Resolutions,
};
use tapdeck_core::{Binding, InputHandler, Vec2};
use tracing::trace;

/// A button event from a physical controller
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerKey {
    pub device_id: String,
    pub keycode: i32,
    pub pressed: bool,
    /// Auto-repeat count; only the first event of a press is applied
    pub repeat_count: u32,
    /// The device also reports an analog axis for this trigger key
    pub has_trigger_axis: bool,
}

impl ControllerKey {
    pub fn new(device_id: impl Into<String>, keycode: i32, pressed: bool) -> Self {
        Self {
            device_id: device_id.into(),
            keycode,
            pressed,
            repeat_count: 0,
            has_trigger_axis: false,
        }
    }

    pub fn with_trigger_axis(mut self, has_axis: bool) -> Self {
        self.has_trigger_axis = has_axis;
        self
    }

    pub fn with_repeat_count(mut self, count: u32) -> Self {
        self.repeat_count = count;
        self
    }
}

/// One analog frame from a physical controller
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControllerMotion {
    pub device_id: String,
    pub thumb_l: Vec2,
    pub thumb_r: Vec2,
    /// `0..=1`
    pub trigger_l: f32,
    /// `0..=1`
    pub trigger_r: f32,
    /// `-1`, `0` or `1`
    pub hat_x: f32,
    pub hat_y: f32,
}

impl ControllerMotion {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Self::default()
        }
    }

    fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.thumb_l.x,
            Axis::Y => self.thumb_l.y,
            Axis::Z => self.thumb_r.x,
            Axis::Rz => self.thumb_r.y,
            Axis::HatX => self.hat_x,
            Axis::HatY => self.hat_y,
        }
    }
}

/// Applies physical controller events to a profile's bindings
#[derive(Clone, Debug, Default)]
pub struct PhysicalControllerHandler;

impl PhysicalControllerHandler {
    pub fn new() -> Self {
        Self
    }

    /// Returns true when the key is bound for this device
    pub fn handle_key(
        &self,
        key: &ControllerKey,
        profile: &ControlsProfile,
        dispatcher: &mut InputDispatcher,
    ) -> bool {
        if key.repeat_count != 0 {
            return false;
        }
        let Some(binding) = profile
            .controller(&key.device_id)
            .and_then(|c| c.binding_for(key.keycode))
        else {
            return false;
        };

        let trigger_key = matches!(key.keycode, keycodes::BUTTON_L2 | keycodes::BUTTON_R2);
        if trigger_key && is_trigger_binding(binding) && key.has_trigger_axis {
            // the analog axis reports this trigger; a digital press would spike it to 1
            trace!(keycode = key.keycode, "digital trigger ignored");
            return true;
        }
        let offset = if key.pressed && is_trigger_binding(binding) {
            1.0
        } else {
            0.0
        };
        dispatcher.handle_input_event(binding, key.pressed, offset);
        true
    }

    /// Returns true when a controller table exists for this device
    pub fn handle_motion(
        &self,
        motion: &ControllerMotion,
        profile: &ControlsProfile,
        dispatcher: &mut InputDispatcher,
    ) -> bool {
        let Some(controller) = profile.controller(&motion.device_id) else {
            return false;
        };

        for (keycode, value) in [
            (keycodes::BUTTON_L2, motion.trigger_l),
            (keycodes::BUTTON_R2, motion.trigger_r),
        ] {
            if let Some(binding) = controller.binding_for(keycode) {
                dispatcher.handle_input_event(binding, value > 0.0, value);
            }
        }

        let resolutions = resolve_axes(controller, motion);
        let mut pointer_motion = Vec2::ZERO;
        for Resolution {
            binding,
            pressed,
            offset,
        } in resolutions
        {
            match binding {
                // several axes may steer the pointer; their contributions add up
                Binding::PointerMove(direction) => {
                    if pressed {
                        let amount = if offset != 0.0 {
                            offset
                        } else {
                            direction.sign()
                        };
                        if direction.is_horizontal() {
                            pointer_motion.x += amount;
                        } else {
                            pointer_motion.y += amount;
                        }
                    }
                }
                _ => dispatcher.handle_input_event(binding, pressed, offset),
            }
        }

        // components no axis steers belong to on-screen controls and keys
        let (steers_x, steers_y) = pointer_axes(controller);
        if steers_x || steers_y {
            let mut next = dispatcher.pointer_motion();
            if steers_x {
                next.x = pointer_motion.x;
            }
            if steers_y {
                next.y = pointer_motion.y;
            }
            dispatcher.set_pointer_motion(next);
        }
        true
    }
}

/// Which pointer-motion components some axis of `controller` is bound to
fn pointer_axes(controller: &ExternalController) -> (bool, bool) {
    let mut steers = (false, false);
    for axis in Axis::ALL {
        for sign in [1.0, -1.0] {
            if let Some(Binding::PointerMove(direction)) =
                controller.binding_for(keycode_for_axis(axis, sign))
            {
                if direction.is_horizontal() {
                    steers.0 = true;
                } else {
                    steers.1 = true;
                }
            }
        }
    }
    steers
}

fn resolve_axes(controller: &ExternalController, motion: &ControllerMotion) -> Resolutions {
    let mut out: Resolutions = SmallVec::new();
    for axis in Axis::ALL {
        controller.resolve_axis(axis, motion.axis(axis), &mut out);
    }
    out
}
