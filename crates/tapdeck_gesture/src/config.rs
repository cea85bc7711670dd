//! Touchscreen gesture configuration
//!
//! Stored per game as a JSON string with camelCase keys. Parsing never fails:
//! blank or invalid input yields the defaults, and missing keys take their
//! individual defaults.

use serde::{Deserialize, Serialize};
use tapdeck_core::{KeyCode, PointerButton};
use tracing::warn;

pub const DEFAULT_DELAY_MS: u64 = 300;
/// Maximum distance in guest pixels between the taps of a double-tap
pub const DOUBLE_TAP_DISTANCE_PX: f32 = 100.0;

/// Pointer button action used by tap, long-press and two-finger tap
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClickAction {
    #[default]
    LeftClick,
    RightClick,
    MiddleClick,
}

impl ClickAction {
    pub fn button(self) -> PointerButton {
        match self {
            ClickAction::LeftClick => PointerButton::Left,
            ClickAction::RightClick => PointerButton::Right,
            ClickAction::MiddleClick => PointerButton::Middle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClickAction::LeftClick => "left_click",
            ClickAction::RightClick => "right_click",
            ClickAction::MiddleClick => "middle_click",
        }
    }
}

/// Unknown names click the left button
impl From<String> for ClickAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "right_click" => ClickAction::RightClick,
            "middle_click" => ClickAction::MiddleClick,
            _ => ClickAction::LeftClick,
        }
    }
}

impl From<ClickAction> for String {
    fn from(action: ClickAction) -> Self {
        action.name().to_string()
    }
}

/// What a locked two-finger pan drives
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PanAction {
    #[default]
    MiddleMousePan,
    Wasd,
    ArrowKeys,
    /// Unrecognized name; panning locks in but does nothing
    Unknown(String),
}

impl PanAction {
    /// Keys in `left, right, up, down` order for key-driven panning
    pub fn keys(&self) -> Option<[KeyCode; 4]> {
        match self {
            PanAction::Wasd => Some([KeyCode::A, KeyCode::D, KeyCode::W, KeyCode::S]),
            PanAction::ArrowKeys => Some([KeyCode::LEFT, KeyCode::RIGHT, KeyCode::UP, KeyCode::DOWN]),
            _ => None,
        }
    }
}

impl From<String> for PanAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "middle_mouse_pan" => PanAction::MiddleMousePan,
            "wasd" => PanAction::Wasd,
            "arrow_keys" => PanAction::ArrowKeys,
            _ => PanAction::Unknown(name),
        }
    }
}

impl From<PanAction> for String {
    fn from(action: PanAction) -> Self {
        match action {
            PanAction::MiddleMousePan => "middle_mouse_pan".to_string(),
            PanAction::Wasd => "wasd".to_string(),
            PanAction::ArrowKeys => "arrow_keys".to_string(),
            PanAction::Unknown(name) => name,
        }
    }
}

/// What a locked pinch drives
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoomAction {
    #[default]
    ScrollWheel,
    PlusMinus,
    PageUpDown,
    Unknown(String),
}

impl From<String> for ZoomAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "scroll_wheel" => ZoomAction::ScrollWheel,
            "plus_minus" => ZoomAction::PlusMinus,
            "page_up_down" => ZoomAction::PageUpDown,
            _ => ZoomAction::Unknown(name),
        }
    }
}

impl From<ZoomAction> for String {
    fn from(action: ZoomAction) -> Self {
        match action {
            ZoomAction::ScrollWheel => "scroll_wheel".to_string(),
            ZoomAction::PlusMinus => "plus_minus".to_string(),
            ZoomAction::PageUpDown => "page_up_down".to_string(),
            ZoomAction::Unknown(name) => name,
        }
    }
}

fn yes() -> bool {
    true
}

fn default_delay() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_right_click() -> ClickAction {
    ClickAction::RightClick
}

/// A stored config without a pan action predates middle-button panning
fn default_stored_pan() -> PanAction {
    PanAction::ArrowKeys
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchGestureConfig {
    #[serde(default = "yes")]
    pub tap_enabled: bool,
    #[serde(default = "yes")]
    pub drag_enabled: bool,

    #[serde(default)]
    pub long_press_enabled: bool,
    #[serde(default = "default_right_click")]
    pub long_press_action: ClickAction,
    #[serde(default = "default_delay")]
    pub long_press_delay: u64,

    #[serde(default = "yes")]
    pub double_tap_enabled: bool,
    #[serde(default = "default_delay")]
    pub double_tap_delay: u64,

    #[serde(default = "yes")]
    pub two_finger_drag_enabled: bool,
    #[serde(default = "default_stored_pan")]
    pub two_finger_drag_action: PanAction,

    #[serde(default = "yes")]
    pub pinch_enabled: bool,
    #[serde(default)]
    pub pinch_action: ZoomAction,

    #[serde(default = "yes")]
    pub two_finger_tap_enabled: bool,
    #[serde(default = "default_right_click")]
    pub two_finger_tap_action: ClickAction,
}

impl Default for TouchGestureConfig {
    fn default() -> Self {
        Self {
            tap_enabled: true,
            drag_enabled: true,
            long_press_enabled: false,
            long_press_action: ClickAction::RightClick,
            long_press_delay: DEFAULT_DELAY_MS,
            double_tap_enabled: true,
            double_tap_delay: DEFAULT_DELAY_MS,
            two_finger_drag_enabled: true,
            two_finger_drag_action: PanAction::MiddleMousePan,
            pinch_enabled: true,
            pinch_action: ZoomAction::ScrollWheel,
            two_finger_tap_enabled: true,
            two_finger_tap_action: ClickAction::RightClick,
        }
    }
}

impl TouchGestureConfig {
    /// Parse a stored config; blank or invalid input yields the defaults
    pub fn from_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "invalid gesture config, using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = TouchGestureConfig::default();
        assert!(config.tap_enabled);
        assert!(!config.long_press_enabled);
        assert_eq!(config.long_press_delay, 300);
        assert_eq!(config.two_finger_drag_action, PanAction::MiddleMousePan);
        assert_eq!(config.two_finger_tap_action.button(), PointerButton::Right);
    }

    #[test]
    fn test_invalid_and_blank_fall_back() {
        assert_eq!(TouchGestureConfig::from_json(""), TouchGestureConfig::default());
        assert_eq!(TouchGestureConfig::from_json("   "), TouchGestureConfig::default());
        assert_eq!(
            TouchGestureConfig::from_json("{not json"),
            TouchGestureConfig::default()
        );
    }

    #[test]
    fn test_partial_document() {
        let config = TouchGestureConfig::from_json(
            r#"{"longPressEnabled": true, "longPressAction": "middle_click",
                "longPressDelay": 450, "pinchAction": "page_up_down",
                "twoFingerTapAction": "bogus"}"#,
        );
        assert!(config.long_press_enabled);
        assert_eq!(config.long_press_action, ClickAction::MiddleClick);
        assert_eq!(config.long_press_delay, 450);
        assert_eq!(config.pinch_action, ZoomAction::PageUpDown);
        assert_eq!(config.two_finger_tap_action, ClickAction::LeftClick);
        // missing pan action in a stored document means arrow keys
        assert_eq!(config.two_finger_drag_action, PanAction::ArrowKeys);
        assert!(config.double_tap_enabled);
    }

    #[test]
    fn test_json_keeps_unknown_actions() {
        let config = TouchGestureConfig {
            two_finger_drag_action: PanAction::Unknown("orbit".into()),
            ..TouchGestureConfig::default()
        };
        let json = config.to_json();
        assert!(json.contains(r#""twoFingerDragAction":"orbit""#));
        assert_eq!(TouchGestureConfig::from_json(&json), config);
    }

    #[test]
    fn test_pan_keys() {
        assert_eq!(
            PanAction::Wasd.keys(),
            Some([KeyCode::A, KeyCode::D, KeyCode::W, KeyCode::S])
        );
        assert_eq!(PanAction::MiddleMousePan.keys(), None);
    }
}
