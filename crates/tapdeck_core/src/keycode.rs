//! X11 keycodes understood by the guest display server
//!
//! Values follow the evdev+8 layout used by X servers. Each code also has a
//! stable name used in persisted bindings (`KEY_<name>`).

use std::fmt;

/// Keyboard key code as delivered to the display server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

macro_rules! keycodes {
    ($($konst:ident => $label:literal = $code:literal,)*) => {
        impl KeyCode {
            $(pub const $konst: KeyCode = KeyCode($code);)*
        }

        const NAMED_KEYS: &[(&str, KeyCode)] = &[$(($label, KeyCode($code)),)*];
    };
}

keycodes! {
    ESC => "ESC" = 9,
    NUM_1 => "1" = 10,
    NUM_2 => "2" = 11,
    NUM_3 => "3" = 12,
    NUM_4 => "4" = 13,
    NUM_5 => "5" = 14,
    NUM_6 => "6" = 15,
    NUM_7 => "7" = 16,
    NUM_8 => "8" = 17,
    NUM_9 => "9" = 18,
    NUM_0 => "0" = 19,
    MINUS => "MINUS" = 20,
    EQUAL => "EQUAL" = 21,
    BACKSPACE => "BKSP" = 22,
    TAB => "TAB" = 23,
    Q => "Q" = 24,
    W => "W" = 25,
    E => "E" = 26,
    R => "R" = 27,
    T => "T" = 28,
    Y => "Y" = 29,
    U => "U" = 30,
    I => "I" = 31,
    O => "O" = 32,
    P => "P" = 33,
    BRACKET_LEFT => "BRACKET_LEFT" = 34,
    BRACKET_RIGHT => "BRACKET_RIGHT" = 35,
    ENTER => "ENTER" = 36,
    CTRL_L => "CTRL_L" = 37,
    A => "A" = 38,
    S => "S" = 39,
    D => "D" = 40,
    F => "F" = 41,
    G => "G" = 42,
    H => "H" = 43,
    J => "J" = 44,
    K => "K" = 45,
    L => "L" = 46,
    SEMICOLON => "SEMICOLON" = 47,
    APOSTROPHE => "APOSTROPHE" = 48,
    GRAVE => "GRAVE" = 49,
    SHIFT_L => "SHIFT_L" = 50,
    BACKSLASH => "BACKSLASH" = 51,
    Z => "Z" = 52,
    X => "X" = 53,
    C => "C" = 54,
    V => "V" = 55,
    B => "B" = 56,
    N => "N" = 57,
    M => "M" = 58,
    COMMA => "COMMA" = 59,
    PERIOD => "PERIOD" = 60,
    SLASH => "SLASH" = 61,
    SHIFT_R => "SHIFT_R" = 62,
    KP_MULTIPLY => "KP_MULTIPLY" = 63,
    ALT_L => "ALT_L" = 64,
    SPACE => "SPACE" = 65,
    CAPS_LOCK => "CAPS_LOCK" = 66,
    F1 => "F1" = 67,
    F2 => "F2" = 68,
    F3 => "F3" = 69,
    F4 => "F4" = 70,
    F5 => "F5" = 71,
    F6 => "F6" = 72,
    F7 => "F7" = 73,
    F8 => "F8" = 74,
    F9 => "F9" = 75,
    F10 => "F10" = 76,
    NUM_LOCK => "NUM_LOCK" = 77,
    SCROLL_LOCK => "SCROLL_LOCK" = 78,
    KP_7 => "KP_7" = 79,
    KP_8 => "KP_8" = 80,
    KP_9 => "KP_9" = 81,
    KP_SUBTRACT => "KP_SUBTRACT" = 82,
    KP_4 => "KP_4" = 83,
    KP_5 => "KP_5" = 84,
    KP_6 => "KP_6" = 85,
    KP_ADD => "KP_ADD" = 86,
    KP_1 => "KP_1" = 87,
    KP_2 => "KP_2" = 88,
    KP_3 => "KP_3" = 89,
    KP_0 => "KP_0" = 90,
    KP_DEL => "KP_DEL" = 91,
    F11 => "F11" = 95,
    F12 => "F12" = 96,
    KP_ENTER => "KP_ENTER" = 104,
    CTRL_R => "CTRL_R" = 105,
    KP_DIVIDE => "KP_DIVIDE" = 106,
    ALT_R => "ALT_R" = 108,
    HOME => "HOME" = 110,
    UP => "UP" = 111,
    PRIOR => "PRIOR" = 112,
    LEFT => "LEFT" = 113,
    RIGHT => "RIGHT" = 114,
    END => "END" = 115,
    DOWN => "DOWN" = 116,
    NEXT => "NEXT" = 117,
    INSERT => "INSERT" = 118,
    DELETE => "DELETE" = 119,
}

impl KeyCode {
    /// Letters in alphabetical order
    pub const LETTERS: [KeyCode; 26] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
        Self::M,
        Self::N,
        Self::O,
        Self::P,
        Self::Q,
        Self::R,
        Self::S,
        Self::T,
        Self::U,
        Self::V,
        Self::W,
        Self::X,
        Self::Y,
        Self::Z,
    ];

    /// Top-row digits 0 through 9
    pub const DIGITS: [KeyCode; 10] = [
        Self::NUM_0,
        Self::NUM_1,
        Self::NUM_2,
        Self::NUM_3,
        Self::NUM_4,
        Self::NUM_5,
        Self::NUM_6,
        Self::NUM_7,
        Self::NUM_8,
        Self::NUM_9,
    ];

    /// Function keys F1 through F12
    pub const FUNCTION_KEYS: [KeyCode; 12] = [
        Self::F1,
        Self::F2,
        Self::F3,
        Self::F4,
        Self::F5,
        Self::F6,
        Self::F7,
        Self::F8,
        Self::F9,
        Self::F10,
        Self::F11,
        Self::F12,
    ];

    /// Keypad digits 0 through 9
    pub const KEYPAD_DIGITS: [KeyCode; 10] = [
        Self::KP_0,
        Self::KP_1,
        Self::KP_2,
        Self::KP_3,
        Self::KP_4,
        Self::KP_5,
        Self::KP_6,
        Self::KP_7,
        Self::KP_8,
        Self::KP_9,
    ];

    /// Look up a key by its persisted name (without the `KEY_` prefix)
    pub fn from_name(name: &str) -> Option<KeyCode> {
        NAMED_KEYS
            .iter()
            .find(|(label, _)| *label == name)
            .map(|(_, code)| *code)
    }

    /// Persisted name, if this is a named key
    pub fn name(&self) -> Option<&'static str> {
        NAMED_KEYS
            .iter()
            .find(|(_, code)| code == self)
            .map(|(label, _)| *label)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "keycode {}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup() {
        assert_eq!(KeyCode::from_name("W"), Some(KeyCode::W));
        assert_eq!(KeyCode::from_name("1"), Some(KeyCode::NUM_1));
        assert_eq!(KeyCode::from_name("PRIOR"), Some(KeyCode(112)));
        assert_eq!(KeyCode::from_name("NOPE"), None);
        assert_eq!(KeyCode::EQUAL.name(), Some("EQUAL"));
        assert_eq!(KeyCode(500).name(), None);
    }

    #[test]
    fn test_named_codes_are_unique() {
        for (i, (label, code)) in NAMED_KEYS.iter().enumerate() {
            for (other_label, other_code) in &NAMED_KEYS[i + 1..] {
                assert_ne!(label, other_label);
                assert_ne!(code, other_code, "{label} and {other_label} share a code");
            }
        }
    }
}
