//! Aggregated virtual controller state

use crate::binding::{Direction, GamepadButton, Stick};
use crate::geometry::Vec2;

/// Snapshot of a virtual gamepad.
///
/// Stick axes are kept within `[-1, 1]` and triggers within `[0, 1]` by every
/// setter, so a state can be forwarded to the guest without re-validation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GamepadState {
    buttons: u16,
    thumb_l: Vec2,
    thumb_r: Vec2,
    trigger_l: f32,
    trigger_r: f32,
    dpad: u8,
}

impl GamepadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&mut self, button: GamepadButton, pressed: bool) {
        let bit = 1u16 << button.index();
        if pressed {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
    }

    pub fn is_pressed(&self, button: GamepadButton) -> bool {
        self.buttons & (1u16 << button.index()) != 0
    }

    /// Raw button bitset, bit `n` is [`GamepadButton`] index `n`
    pub fn buttons(&self) -> u16 {
        self.buttons
    }

    /// Overwrite one axis of a stick. The value is clamped to `[-1, 1]`.
    pub fn set_stick_axis(&mut self, stick: Stick, horizontal: bool, value: f32) {
        let value = clamp_finite(value, -1.0, 1.0);
        let thumb = match stick {
            Stick::Left => &mut self.thumb_l,
            Stick::Right => &mut self.thumb_r,
        };
        if horizontal {
            thumb.x = value;
        } else {
            thumb.y = value;
        }
    }

    pub fn thumb(&self, stick: Stick) -> Vec2 {
        match stick {
            Stick::Left => self.thumb_l,
            Stick::Right => self.thumb_r,
        }
    }

    /// Set the analog trigger paired with L2 or R2, clamped to `[0, 1]`.
    /// Other buttons have no trigger and are ignored.
    pub fn set_trigger(&mut self, button: GamepadButton, value: f32) {
        let value = clamp_finite(value, 0.0, 1.0);
        match button {
            GamepadButton::L2 => self.trigger_l = value,
            GamepadButton::R2 => self.trigger_r = value,
            _ => {}
        }
    }

    pub fn trigger_l(&self) -> f32 {
        self.trigger_l
    }

    pub fn trigger_r(&self) -> f32 {
        self.trigger_r
    }

    pub fn set_dpad(&mut self, direction: Direction, pressed: bool) {
        let bit = 1u8 << direction.index();
        if pressed {
            self.dpad |= bit;
        } else {
            self.dpad &= !bit;
        }
    }

    pub fn dpad(&self, direction: Direction) -> bool {
        self.dpad & (1u8 << direction.index()) != 0
    }

    /// 4-bit mask in `up, right, down, left` bit order
    pub fn dpad_mask(&self) -> u8 {
        self.dpad
    }

    /// Horizontal dpad as -1, 0 or 1
    pub fn dpad_x(&self) -> i8 {
        self.dpad(Direction::Right) as i8 - self.dpad(Direction::Left) as i8
    }

    /// Vertical dpad as -1, 0 or 1 (down is positive)
    pub fn dpad_y(&self) -> i8 {
        self.dpad(Direction::Down) as i8 - self.dpad(Direction::Up) as i8
    }

    /// Field-wise overwrite from another state
    pub fn copy_from(&mut self, other: &GamepadState) {
        *self = *other;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when nothing is pressed or deflected
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_bits() {
        let mut state = GamepadState::new();
        state.set_pressed(GamepadButton::A, true);
        state.set_pressed(GamepadButton::R2, true);
        assert_eq!(state.buttons(), 0b1000_0000_0001);
        state.set_pressed(GamepadButton::A, false);
        assert!(!state.is_pressed(GamepadButton::A));
        assert!(state.is_pressed(GamepadButton::R2));
    }

    #[test]
    fn test_axes_are_clamped() {
        let mut state = GamepadState::new();
        state.set_stick_axis(Stick::Left, true, 2.5);
        state.set_stick_axis(Stick::Left, false, -7.0);
        state.set_stick_axis(Stick::Right, true, f32::NAN);
        assert_eq!(state.thumb(Stick::Left), Vec2::new(1.0, -1.0));
        assert_eq!(state.thumb(Stick::Right).x, 0.0);

        state.set_trigger(GamepadButton::L2, 1.5);
        state.set_trigger(GamepadButton::R2, -0.5);
        state.set_trigger(GamepadButton::A, 1.0);
        assert_eq!(state.trigger_l(), 1.0);
        assert_eq!(state.trigger_r(), 0.0);
    }

    #[test]
    fn test_dpad_mask() {
        let mut state = GamepadState::new();
        state.set_dpad(Direction::Up, true);
        state.set_dpad(Direction::Left, true);
        assert_eq!(state.dpad_mask(), 0b1001);
        assert_eq!(state.dpad_x(), -1);
        assert_eq!(state.dpad_y(), -1);
        state.set_dpad(Direction::Up, false);
        assert_eq!(state.dpad_y(), 0);
    }

    #[test]
    fn test_copy_overwrites() {
        let mut target = GamepadState::new();
        target.set_pressed(GamepadButton::B, true);
        target.set_stick_axis(Stick::Left, true, 0.5);

        let mut source = GamepadState::new();
        source.set_stick_axis(Stick::Left, true, 0.25);

        target.copy_from(&source);
        assert_eq!(target, source);
        assert!(!target.is_pressed(GamepadButton::B));
    }
}
