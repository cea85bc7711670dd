//! Effective shooter-mode parameters
//!
//! A shooter-mode element in the profile carries its own movement and look
//! configuration, and that configuration always wins. Without one, container
//! auto-shooter mode falls back to the left stick for movement and the
//! right stick for look.

use tapdeck_controls::{ElementSet, ElementType, LookType, MovementType, ShooterConfig};
use tapdeck_core::{Binding, Stick};

use crate::joystick::Quadrants;

/// Joystick radius in snaps before `joystick_size` scaling
pub const JOYSTICK_RADIUS_SNAPS: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShooterSettings {
    pub movement: MovementType,
    pub look: LookType,
    pub look_sensitivity: f32,
    pub joystick_size: f32,
}

impl ShooterSettings {
    /// Defaults for container auto-shooter mode
    pub fn container_defaults() -> Self {
        Self {
            movement: MovementType::GamepadLeftStick,
            look: LookType::GamepadRightStick,
            look_sensitivity: 1.0,
            joystick_size: 1.0,
        }
    }

    /// Resolve from an optional element config.
    ///
    /// Without an element the movement stick is always the left gamepad
    /// stick; look uses the right stick only while container mode is on.
    pub fn resolve(element: Option<&ShooterConfig>, container_runtime: bool) -> Self {
        match element {
            Some(config) => Self {
                movement: config.movement,
                look: config.look,
                look_sensitivity: config.look_sensitivity,
                joystick_size: config.joystick_size,
            },
            None => Self {
                look: if container_runtime {
                    LookType::GamepadRightStick
                } else {
                    LookType::TouchDrag
                },
                ..Self::container_defaults()
            },
        }
    }

    /// Resolve from the first shooter-mode element in `elements`, if any
    pub fn from_elements(elements: &ElementSet, container_runtime: bool) -> Self {
        let config = elements
            .find_type(ElementType::ShooterMode)
            .and_then(|id| elements.get(id))
            .map(|e| e.shooter_config());
        Self::resolve(config, container_runtime)
    }

    pub fn uses_right_stick(&self) -> bool {
        self.look == LookType::GamepadRightStick
    }

    pub fn movement_bindings(&self) -> Quadrants {
        self.movement.bindings()
    }

    pub fn right_stick_bindings(&self) -> Quadrants {
        Binding::stick_quadrants(Stick::Right)
    }

    /// Joystick radius in view pixels
    pub fn radius(&self, snapping: f32) -> f32 {
        snapping * JOYSTICK_RADIUS_SNAPS * self.joystick_size
    }
}

impl Default for ShooterSettings {
    fn default() -> Self {
        Self::container_defaults()
    }
}
