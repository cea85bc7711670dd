//! Physical controller binding tables
//!
//! An [`ExternalController`] maps platform keycodes to [`Binding`]s. Analog
//! axes have no keycode of their own, so each `(axis, sign)` pair is given a
//! synthetic negative keycode that the same table can store.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tapdeck_core::Binding;

use crate::element::STICK_DEAD_ZONE;

/// Device id of the controller that matches any device
pub const WILDCARD: &str = "*";

/// Platform gamepad keycodes
pub mod keycodes {
    pub const DPAD_UP: i32 = 19;
    pub const DPAD_DOWN: i32 = 20;
    pub const DPAD_LEFT: i32 = 21;
    pub const DPAD_RIGHT: i32 = 22;
    pub const BUTTON_A: i32 = 96;
    pub const BUTTON_B: i32 = 97;
    pub const BUTTON_X: i32 = 99;
    pub const BUTTON_Y: i32 = 100;
    pub const BUTTON_L1: i32 = 102;
    pub const BUTTON_R1: i32 = 103;
    pub const BUTTON_L2: i32 = 104;
    pub const BUTTON_R2: i32 = 105;
    pub const BUTTON_THUMBL: i32 = 106;
    pub const BUTTON_THUMBR: i32 = 107;
    pub const BUTTON_START: i32 = 108;
    pub const BUTTON_SELECT: i32 = 109;
}

/// Analog axes read from a controller motion frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    Rz,
    HatX,
    HatY,
}

impl Axis {
    pub const ALL: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::Rz, Axis::HatX, Axis::HatY];
}

/// Keycode standing in for an axis deflected towards `sign`.
///
/// Hat axes reuse the dpad keycodes; stick axes use negative codes.
pub fn keycode_for_axis(axis: Axis, sign: f32) -> i32 {
    let positive = sign > 0.0;
    match axis {
        Axis::X => {
            if positive {
                -2
            } else {
                -1
            }
        }
        Axis::Y => {
            if positive {
                -4
            } else {
                -3
            }
        }
        Axis::Z => {
            if positive {
                -6
            } else {
                -5
            }
        }
        Axis::Rz => {
            if positive {
                -8
            } else {
                -7
            }
        }
        Axis::HatX => {
            if positive {
                keycodes::DPAD_RIGHT
            } else {
                keycodes::DPAD_LEFT
            }
        }
        Axis::HatY => {
            if positive {
                keycodes::DPAD_DOWN
            } else {
                keycodes::DPAD_UP
            }
        }
    }
}

/// One binding activation derived from a controller event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub binding: Binding,
    pub pressed: bool,
    pub offset: f32,
}

pub type Resolutions = SmallVec<[Resolution; 4]>;

/// Keycode → binding table for one physical device
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalController {
    id: String,
    name: String,
    bindings: FxHashMap<i32, Binding>,
}

impl ExternalController {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bindings: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_wildcard(&self) -> bool {
        self.id == WILDCARD
    }

    pub fn set_binding(&mut self, keycode: i32, binding: Binding) {
        self.bindings.insert(keycode, binding);
    }

    pub fn remove_binding(&mut self, keycode: i32) -> Option<Binding> {
        self.bindings.remove(&keycode)
    }

    pub fn binding_for(&self, keycode: i32) -> Option<Binding> {
        self.bindings.get(&keycode).copied()
    }

    /// Bindings sorted by keycode, for stable persistence
    pub fn bindings(&self) -> Vec<(i32, Binding)> {
        let mut all: Vec<_> = self.bindings.iter().map(|(k, b)| (*k, *b)).collect();
        all.sort_by_key(|(k, _)| *k);
        all
    }

    /// Resolve one axis reading.
    ///
    /// At or past the dead zone the binding for the deflected side activates with
    /// the raw value as offset; inside it both sides release.
    pub fn resolve_axis(&self, axis: Axis, value: f32, out: &mut Resolutions) {
        if value.abs() >= STICK_DEAD_ZONE {
            if let Some(binding) = self.binding_for(keycode_for_axis(axis, value)) {
                out.push(Resolution {
                    binding,
                    pressed: true,
                    offset: value,
                });
            }
        } else {
            for sign in [1.0, -1.0] {
                if let Some(binding) = self.binding_for(keycode_for_axis(axis, sign)) {
                    out.push(Resolution {
                        binding,
                        pressed: false,
                        offset: value,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapdeck_core::{Direction, GamepadButton, Stick};

    fn pad() -> ExternalController {
        let mut c = ExternalController::new(WILDCARD, "Any");
        c.set_binding(keycodes::BUTTON_A, Binding::GamepadButton(GamepadButton::A));
        c.set_binding(
            keycode_for_axis(Axis::X, 1.0),
            Binding::GamepadStick(Stick::Left, Direction::Right),
        );
        c.set_binding(
            keycode_for_axis(Axis::X, -1.0),
            Binding::GamepadStick(Stick::Left, Direction::Left),
        );
        c
    }

    #[test]
    fn test_axis_keycodes() {
        assert_eq!(keycode_for_axis(Axis::X, 0.5), -2);
        assert_eq!(keycode_for_axis(Axis::X, -0.5), -1);
        assert_eq!(keycode_for_axis(Axis::Rz, -1.0), -7);
        assert_eq!(keycode_for_axis(Axis::HatY, -1.0), keycodes::DPAD_UP);
    }

    #[test]
    fn test_axis_activation_and_release() {
        let c = pad();
        let mut out = Resolutions::new();
        c.resolve_axis(Axis::X, -0.6, &mut out);
        assert_eq!(
            out.as_slice(),
            &[Resolution {
                binding: Binding::GamepadStick(Stick::Left, Direction::Left),
                pressed: true,
                offset: -0.6,
            }]
        );

        out.clear();
        c.resolve_axis(Axis::X, 0.149, &mut out);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| !r.pressed));

        out.clear();
        c.resolve_axis(Axis::X, 0.15, &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].pressed);
    }

    #[test]
    fn test_unbound_axis_resolves_nothing() {
        let c = pad();
        let mut out = Resolutions::new();
        c.resolve_axis(Axis::Z, 0.9, &mut out);
        c.resolve_axis(Axis::Z, 0.0, &mut out);
        assert!(out.is_empty());
    }
}
