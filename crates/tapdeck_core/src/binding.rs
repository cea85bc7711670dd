//! Semantic input actions
//!
//! A [`Binding`] names what a control does (press `W`, click the left mouse
//! button, push the left stick up) independent of the touch or controller
//! event that triggered it. Each variant carries only the data its category
//! needs, so a key binding can never hold a gamepad axis.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseBindingError;
use crate::keycode::KeyCode;

/// One of the four cardinal directions, in `up, right, down, left` order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise order starting at up; matches the quadrant order of stick bindings
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Screen-space sign of this direction along its axis (y grows downwards)
    pub fn sign(self) -> f32 {
        match self {
            Direction::Up | Direction::Left => -1.0,
            Direction::Right | Direction::Down => 1.0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Right => "RIGHT",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }
}

/// Pointer buttons as numbered by the display server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
}

impl PointerButton {
    /// X11 button number
    pub fn code(self) -> u8 {
        match self {
            PointerButton::Left => 1,
            PointerButton::Middle => 2,
            PointerButton::Right => 3,
            PointerButton::ScrollUp => 4,
            PointerButton::ScrollDown => 5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PointerButton::Left => "MOUSE_LEFT_BUTTON",
            PointerButton::Middle => "MOUSE_MIDDLE_BUTTON",
            PointerButton::Right => "MOUSE_RIGHT_BUTTON",
            PointerButton::ScrollUp => "MOUSE_SCROLL_UP",
            PointerButton::ScrollDown => "MOUSE_SCROLL_DOWN",
        }
    }
}

/// Virtual gamepad buttons; the discriminant is the button-bitset index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    L1 = 4,
    R1 = 5,
    Select = 6,
    Start = 7,
    L3 = 8,
    R3 = 9,
    L2 = 10,
    R2 = 11,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 12] = [
        GamepadButton::A,
        GamepadButton::B,
        GamepadButton::X,
        GamepadButton::Y,
        GamepadButton::L1,
        GamepadButton::R1,
        GamepadButton::Select,
        GamepadButton::Start,
        GamepadButton::L3,
        GamepadButton::R3,
        GamepadButton::L2,
        GamepadButton::R2,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// L2 and R2 also drive an analog trigger
    pub fn is_trigger(self) -> bool {
        matches!(self, GamepadButton::L2 | GamepadButton::R2)
    }

    fn name(self) -> &'static str {
        match self {
            GamepadButton::A => "A",
            GamepadButton::B => "B",
            GamepadButton::X => "X",
            GamepadButton::Y => "Y",
            GamepadButton::L1 => "L1",
            GamepadButton::R1 => "R1",
            GamepadButton::Select => "SELECT",
            GamepadButton::Start => "START",
            GamepadButton::L3 => "L3",
            GamepadButton::R3 => "R3",
            GamepadButton::L2 => "L2",
            GamepadButton::R2 => "R2",
        }
    }
}

/// Analog stick selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    fn name(self) -> &'static str {
        match self {
            Stick::Left => "LEFT",
            Stick::Right => "RIGHT",
        }
    }
}

/// Category of a binding; exactly one per value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingCategory {
    Key,
    PointerButton,
    PointerMove,
    GamepadButton,
    GamepadAxis,
}

/// A semantic input action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(KeyCode),
    PointerButton(PointerButton),
    /// Continuous pointer motion while held
    PointerMove(Direction),
    GamepadButton(GamepadButton),
    GamepadDPad(Direction),
    GamepadStick(Stick, Direction),
}

impl Binding {
    pub fn category(&self) -> BindingCategory {
        match self {
            Binding::Key(_) => BindingCategory::Key,
            Binding::PointerButton(_) => BindingCategory::PointerButton,
            Binding::PointerMove(_) => BindingCategory::PointerMove,
            Binding::GamepadButton(_) | Binding::GamepadDPad(_) => BindingCategory::GamepadButton,
            Binding::GamepadStick(..) => BindingCategory::GamepadAxis,
        }
    }

    pub fn is_gamepad(&self) -> bool {
        matches!(
            self.category(),
            BindingCategory::GamepadButton | BindingCategory::GamepadAxis
        )
    }

    pub fn is_pointer_move(&self) -> bool {
        self.category() == BindingCategory::PointerMove
    }

    /// Gamepad bitset index for button bindings
    pub fn gamepad_index(&self) -> Option<usize> {
        match self {
            Binding::GamepadButton(button) => Some(button.index()),
            _ => None,
        }
    }

    pub fn keycode(&self) -> Option<KeyCode> {
        match self {
            Binding::Key(code) => Some(*code),
            _ => None,
        }
    }

    /// Parse a persisted name; `NONE` and unknown names are unbound.
    pub fn from_name(name: &str) -> Option<Binding> {
        name.parse().ok()
    }

    /// Stick bindings for the four quadrants in `up, right, down, left` order
    pub fn stick_quadrants(stick: Stick) -> [Binding; 4] {
        Direction::ALL.map(|d| Binding::GamepadStick(stick, d))
    }

    /// Keyboard keys for the four quadrants in `up, right, down, left` order
    pub fn key_quadrants(up: KeyCode, right: KeyCode, down: KeyCode, left: KeyCode) -> [Binding; 4] {
        [
            Binding::Key(up),
            Binding::Key(right),
            Binding::Key(down),
            Binding::Key(left),
        ]
    }
}

impl From<KeyCode> for Binding {
    fn from(code: KeyCode) -> Self {
        Binding::Key(code)
    }
}

impl From<PointerButton> for Binding {
    fn from(button: PointerButton) -> Self {
        Binding::PointerButton(button)
    }
}

impl From<GamepadButton> for Binding {
    fn from(button: GamepadButton) -> Self {
        Binding::GamepadButton(button)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Key(code) => match code.name() {
                Some(name) => write!(f, "KEY_{name}"),
                None => write!(f, "KEY_CODE_{}", code.0),
            },
            Binding::PointerButton(button) => f.write_str(button.name()),
            Binding::PointerMove(dir) => write!(f, "MOUSE_MOVE_{}", dir.name()),
            Binding::GamepadButton(button) => write!(f, "GAMEPAD_BUTTON_{}", button.name()),
            Binding::GamepadDPad(dir) => write!(f, "GAMEPAD_DPAD_{}", dir.name()),
            Binding::GamepadStick(stick, dir) => {
                write!(f, "GAMEPAD_{}_THUMB_{}", stick.name(), dir.name())
            }
        }
    }
}

impl FromStr for Binding {
    type Err = ParseBindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseBindingError::Unknown(s.to_string());

        if s == "NONE" || s.is_empty() {
            return Err(ParseBindingError::Unbound);
        }
        if let Some(rest) = s.strip_prefix("KEY_CODE_") {
            return rest
                .parse::<u32>()
                .map(|code| Binding::Key(KeyCode(code)))
                .map_err(|_| unknown());
        }
        if let Some(rest) = s.strip_prefix("KEY_") {
            return KeyCode::from_name(rest).map(Binding::Key).ok_or_else(unknown);
        }
        if let Some(rest) = s.strip_prefix("MOUSE_MOVE_") {
            return Direction::from_name(rest)
                .map(Binding::PointerMove)
                .ok_or_else(unknown);
        }
        if s.starts_with("MOUSE_") {
            return [
                PointerButton::Left,
                PointerButton::Middle,
                PointerButton::Right,
                PointerButton::ScrollUp,
                PointerButton::ScrollDown,
            ]
            .into_iter()
            .find(|b| b.name() == s)
            .map(Binding::PointerButton)
            .ok_or_else(unknown);
        }
        if let Some(rest) = s.strip_prefix("GAMEPAD_BUTTON_") {
            return GamepadButton::ALL
                .into_iter()
                .find(|b| b.name() == rest)
                .map(Binding::GamepadButton)
                .ok_or_else(unknown);
        }
        if let Some(rest) = s.strip_prefix("GAMEPAD_DPAD_") {
            return Direction::from_name(rest)
                .map(Binding::GamepadDPad)
                .ok_or_else(unknown);
        }
        for stick in [Stick::Left, Stick::Right] {
            let prefix = format!("GAMEPAD_{}_THUMB_", stick.name());
            if let Some(rest) = s.strip_prefix(prefix.as_str()) {
                return Direction::from_name(rest)
                    .map(|d| Binding::GamepadStick(stick, d))
                    .ok_or_else(unknown);
            }
        }
        Err(unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_is_exclusive() {
        let cases = [
            (Binding::Key(KeyCode::W), BindingCategory::Key, false),
            (
                Binding::PointerButton(PointerButton::Left),
                BindingCategory::PointerButton,
                false,
            ),
            (
                Binding::PointerMove(Direction::Up),
                BindingCategory::PointerMove,
                false,
            ),
            (
                Binding::GamepadButton(GamepadButton::L2),
                BindingCategory::GamepadButton,
                true,
            ),
            (
                Binding::GamepadDPad(Direction::Left),
                BindingCategory::GamepadButton,
                true,
            ),
            (
                Binding::GamepadStick(Stick::Right, Direction::Down),
                BindingCategory::GamepadAxis,
                true,
            ),
        ];
        for (binding, category, gamepad) in cases {
            assert_eq!(binding.category(), category);
            assert_eq!(binding.is_gamepad(), gamepad);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Binding::from_name("KEY_W"), Some(Binding::Key(KeyCode::W)));
        assert_eq!(
            Binding::from_name("MOUSE_LEFT_BUTTON"),
            Some(Binding::PointerButton(PointerButton::Left))
        );
        assert_eq!(
            Binding::from_name("MOUSE_MOVE_LEFT"),
            Some(Binding::PointerMove(Direction::Left))
        );
        assert_eq!(
            Binding::from_name("GAMEPAD_BUTTON_SELECT"),
            Some(Binding::GamepadButton(GamepadButton::Select))
        );
        assert_eq!(
            Binding::from_name("GAMEPAD_LEFT_THUMB_UP"),
            Some(Binding::GamepadStick(Stick::Left, Direction::Up))
        );
        assert_eq!(
            Binding::from_name("GAMEPAD_DPAD_RIGHT"),
            Some(Binding::GamepadDPad(Direction::Right))
        );
        assert_eq!(Binding::from_name("NONE"), None);
        assert_eq!(Binding::from_name("KEY_BOGUS"), None);
        assert_eq!(Binding::from_name("GAMEPAD_MIDDLE_THUMB_UP"), None);
    }

    #[test]
    fn test_display_matches_parse() {
        for name in [
            "KEY_SHIFT_L",
            "KEY_1",
            "MOUSE_SCROLL_DOWN",
            "MOUSE_MOVE_UP",
            "GAMEPAD_BUTTON_R2",
            "GAMEPAD_DPAD_DOWN",
            "GAMEPAD_RIGHT_THUMB_LEFT",
        ] {
            let binding: Binding = name.parse().unwrap();
            assert_eq!(binding.to_string(), name);
        }
    }

    #[test]
    fn test_unbound_is_distinct_error() {
        assert!(matches!(
            "NONE".parse::<Binding>(),
            Err(ParseBindingError::Unbound)
        ));
        assert!(matches!(
            "KEY_??".parse::<Binding>(),
            Err(ParseBindingError::Unknown(_))
        ));
    }

    #[test]
    fn test_gamepad_index() {
        assert_eq!(Binding::GamepadButton(GamepadButton::A).gamepad_index(), Some(0));
        assert_eq!(Binding::GamepadButton(GamepadButton::R2).gamepad_index(), Some(11));
        assert_eq!(Binding::GamepadDPad(Direction::Up).gamepad_index(), None);
    }
}
