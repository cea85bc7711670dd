//! Persisted control profiles
//!
//! A profile is a JSON document holding the on-screen elements (positions
//! normalized to the viewport) and the physical-controller binding tables.
//! Loading is partial: a malformed element or controller is logged and
//! skipped, and the rest of the document still loads.

use std::fs;
use std::path::Path;

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tapdeck_core::{Binding, Point, Size};
use tracing::{debug, warn};

use crate::controller::ExternalController;
use crate::element::{
    ControlElement, ElementType, LookType, MovementType, Orientation, Range, Shape, MAX_BINDINGS,
};
use crate::error::{ProfileError, Result};
use crate::set::ElementSet;

/// Name given to controllers created on demand
pub const DEFAULT_CONTROLLER_NAME: &str = "Physical Controller";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDocument {
    #[serde(default)]
    id: i32,
    #[serde(default)]
    name: String,
    #[serde(default = "default_one")]
    cursor_speed: f32,
    elements: Option<Vec<Value>>,
    #[serde(default)]
    controllers: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileOut<'a> {
    id: i32,
    name: &'a str,
    cursor_speed: f32,
    elements: Vec<ElementRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    controllers: Vec<ControllerRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default)]
    shape: Option<String>,
    #[serde(default)]
    toggle_switch: bool,
    x: f32,
    y: f32,
    #[serde(default = "default_one")]
    scale: f32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    icon_id: u8,
    #[serde(default)]
    bindings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orientation: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scroll_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shooter_movement_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shooter_look_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shooter_look_sensitivity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shooter_joystick_size: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControllerRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    controller_bindings: Vec<ControllerBindingRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControllerBindingRecord {
    key_code: i32,
    binding: String,
}

fn default_one() -> f32 {
    1.0
}

/// Read one element field by field.
///
/// A malformed optional field falls back to its default; only a missing or
/// malformed `type`, `x` or `y` drops the element.
fn element_record(value: Value) -> Option<ElementRecord> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            warn!(%other, "skipping malformed element");
            return None;
        }
    };
    Some(ElementRecord {
        element_type: required(&object, "type")?,
        x: required(&object, "x")?,
        y: required(&object, "y")?,
        shape: field(&object, "shape"),
        toggle_switch: field(&object, "toggleSwitch").unwrap_or_default(),
        scale: field(&object, "scale").unwrap_or_else(default_one),
        text: field(&object, "text").unwrap_or_default(),
        icon_id: field(&object, "iconId").unwrap_or_default(),
        bindings: field(&object, "bindings").unwrap_or_default(),
        range: field(&object, "range"),
        orientation: field(&object, "orientation"),
        scroll_locked: field(&object, "scrollLocked"),
        shooter_movement_type: field(&object, "shooterMovementType"),
        shooter_look_type: field(&object, "shooterLookType"),
        shooter_look_sensitivity: field(&object, "shooterLookSensitivity"),
        shooter_joystick_size: field(&object, "shooterJoystickSize"),
    })
}

/// A present, non-null field of type `T`; anything else reads as absent
fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key).filter(|value| !value.is_null())?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(field = key, %err, "ignoring malformed element field");
            None
        }
    }
}

fn required<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let parsed = field(object, key);
    if parsed.is_none() {
        warn!(field = key, "skipping element without a usable field");
    }
    parsed
}

/// Parse a unit enum from its serialized variant name
fn parse_variant<T: DeserializeOwned>(name: &str) -> Option<T> {
    let de: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        name.into_deserializer();
    T::deserialize(de).ok()
}

fn variant_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

/// A loaded control profile
#[derive(Clone, Debug)]
pub struct ControlsProfile {
    id: i32,
    name: String,
    cursor_speed: f32,
    elements: ElementSet,
    controllers: Vec<ExternalController>,
    virtual_gamepad: bool,
}

impl ControlsProfile {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cursor_speed: 1.0,
            elements: ElementSet::new(),
            controllers: Vec::new(),
            virtual_gamepad: false,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Profiles whose name mentions "template" are read-only starting points
    pub fn is_template(&self) -> bool {
        self.name.to_lowercase().contains("template")
    }

    pub fn cursor_speed(&self) -> f32 {
        self.cursor_speed
    }

    pub fn set_cursor_speed(&mut self, speed: f32) {
        self.cursor_speed = speed;
    }

    pub fn elements(&self) -> &ElementSet {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut ElementSet {
        &mut self.elements
    }

    /// Whether any element drives the virtual gamepad exclusively
    pub fn is_virtual_gamepad(&self) -> bool {
        self.virtual_gamepad
    }

    /// Recompute [`is_virtual_gamepad`](Self::is_virtual_gamepad) after edits
    pub fn refresh_virtual_gamepad(&mut self) {
        self.virtual_gamepad = self.elements.iter().any(|(_, e)| e.is_all_gamepad());
    }

    pub fn controllers(&self) -> &[ExternalController] {
        &self.controllers
    }

    /// Controller for `device_id`, falling back to the wildcard entry
    pub fn controller(&self, device_id: &str) -> Option<&ExternalController> {
        let found = self
            .controllers
            .iter()
            .find(|c| c.id() == device_id)
            .or_else(|| self.controllers.iter().find(|c| c.is_wildcard()));
        if found.is_none() {
            debug!(device_id, "no controller bindings for device");
        }
        found
    }

    /// Controller with exactly `id`, created if missing
    pub fn add_controller(&mut self, id: &str) -> &mut ExternalController {
        let index = match self.controllers.iter().position(|c| c.id() == id) {
            Some(index) => index,
            None => {
                self.controllers
                    .push(ExternalController::new(id, DEFAULT_CONTROLLER_NAME));
                self.controllers.len() - 1
            }
        };
        &mut self.controllers[index]
    }

    pub fn remove_controller(&mut self, id: &str) -> Option<ExternalController> {
        let index = self.controllers.iter().position(|c| c.id() == id)?;
        Some(self.controllers.remove(index))
    }

    /// Parse a profile, resolving normalized positions against `viewport`
    pub fn from_json(json: &str, viewport: Size) -> Result<Self> {
        if viewport.is_empty() {
            return Err(ProfileError::ViewportNotReady);
        }
        let document: ProfileDocument = serde_json::from_str(json)?;
        let elements = document
            .elements
            .ok_or(ProfileError::MissingField("elements"))?;

        let mut profile = ControlsProfile::new(document.id, document.name);
        profile.cursor_speed = document.cursor_speed;
        profile.elements.set_snapping(viewport.width / 100.0);

        for value in elements {
            if let Some(element) =
                element_record(value).and_then(|record| element_from_record(record, viewport))
            {
                profile.elements.add(element);
            }
        }

        for value in document.controllers {
            match serde_json::from_value::<ControllerRecord>(value) {
                Ok(record) => profile.controllers.push(controller_from_record(record)),
                Err(err) => warn!(%err, "skipping malformed controller"),
            }
        }

        profile.refresh_virtual_gamepad();
        debug!(
            name = %profile.name,
            elements = profile.elements.len(),
            controllers = profile.controllers.len(),
            virtual_gamepad = profile.virtual_gamepad,
            "profile loaded"
        );
        Ok(profile)
    }

    /// Serialize with positions normalized against `viewport`
    pub fn to_json(&self, viewport: Size) -> Result<String> {
        if viewport.is_empty() {
            return Err(ProfileError::ViewportNotReady);
        }
        let out = ProfileOut {
            id: self.id,
            name: &self.name,
            cursor_speed: self.cursor_speed,
            elements: self
                .elements
                .iter()
                .map(|(_, e)| element_to_record(e, viewport))
                .collect(),
            controllers: self.controllers.iter().map(controller_to_record).collect(),
        };
        Ok(serde_json::to_string(&out)?)
    }

    pub fn load(path: impl AsRef<Path>, viewport: Size) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json, viewport)
    }

    pub fn save(&self, path: impl AsRef<Path>, viewport: Size) -> Result<()> {
        let json = self.to_json(viewport)?;
        fs::write(path, json)?;
        debug!(name = %self.name, "profile saved");
        Ok(())
    }
}

fn element_from_record(record: ElementRecord, viewport: Size) -> Option<ControlElement> {
    let Some(element_type) = parse_variant::<ElementType>(&record.element_type) else {
        warn!(element_type = %record.element_type, "skipping element with unknown type");
        return None;
    };
    let mut element = ControlElement::new(element_type);

    if let Some(name) = record.shape.as_deref() {
        match parse_variant::<Shape>(name) {
            Some(shape) => element.set_shape(shape),
            None => warn!(shape = name, "unknown shape, using default"),
        }
    }
    element.set_toggle_switch(record.toggle_switch);
    element.set_position(Point::new(
        (record.x * viewport.width).trunc(),
        (record.y * viewport.height).trunc(),
    ));
    element.set_scale(record.scale);
    element.set_text(record.text);
    element.set_icon_id(record.icon_id);

    if let Some(name) = record.range.as_deref() {
        match parse_variant::<Range>(name) {
            Some(range) => element.set_range(range),
            None => warn!(range = name, "unknown range, using default"),
        }
    }
    if let Some(index) = record.orientation {
        element.set_orientation(Orientation::from_index(index));
    }
    if let Some(locked) = record.scroll_locked {
        element.set_scroll_locked(locked);
    }

    let shooter = element.shooter_config_mut();
    if let Some(name) = record.shooter_movement_type.as_deref() {
        shooter.movement = MovementType::from_name(name);
    }
    if let Some(name) = record.shooter_look_type.as_deref() {
        shooter.look = LookType::from_name(name);
    }
    if let Some(sensitivity) = record.shooter_look_sensitivity {
        shooter.look_sensitivity = sensitivity;
    }
    if let Some(size) = record.shooter_joystick_size {
        shooter.joystick_size = size;
    }

    if !record.bindings.is_empty() {
        for index in 0..MAX_BINDINGS {
            let binding = record
                .bindings
                .get(index)
                .and_then(|name| Binding::from_name(name));
            element.set_binding(index, binding);
        }
    }
    Some(element)
}

fn element_to_record(element: &ControlElement, viewport: Size) -> ElementRecord {
    let position = element.position();
    let is_range = element.element_type() == ElementType::RangeButton;
    let is_shooter = element.element_type() == ElementType::ShooterMode;
    let shooter = element.shooter_config();

    ElementRecord {
        element_type: variant_name(&element.element_type()),
        shape: Some(variant_name(&element.shape())),
        toggle_switch: element.is_toggle_switch(),
        x: position.x / viewport.width,
        y: position.y / viewport.height,
        scale: element.scale(),
        text: element.text().to_string(),
        icon_id: element.icon_id(),
        bindings: element
            .bindings()
            .iter()
            .map(|b| b.map_or_else(|| "NONE".to_string(), |b| b.to_string()))
            .collect(),
        range: is_range.then(|| variant_name(&element.range())),
        orientation: is_range.then(|| element.orientation().index()),
        scroll_locked: is_range.then(|| element.is_scroll_locked()),
        shooter_movement_type: is_shooter.then(|| shooter.movement.name().to_string()),
        shooter_look_type: is_shooter.then(|| shooter.look.name().to_string()),
        shooter_look_sensitivity: is_shooter.then_some(shooter.look_sensitivity),
        shooter_joystick_size: is_shooter.then_some(shooter.joystick_size),
    }
}

fn controller_from_record(record: ControllerRecord) -> ExternalController {
    let mut controller = ExternalController::new(record.id, record.name);
    for entry in record.controller_bindings {
        match Binding::from_name(&entry.binding) {
            Some(binding) => controller.set_binding(entry.key_code, binding),
            None => debug!(
                key_code = entry.key_code,
                binding = %entry.binding,
                "controller binding left unbound"
            ),
        }
    }
    controller
}

fn controller_to_record(controller: &ExternalController) -> ControllerRecord {
    ControllerRecord {
        id: controller.id().to_string(),
        name: controller.name().to_string(),
        controller_bindings: controller
            .bindings()
            .into_iter()
            .map(|(key_code, binding)| ControllerBindingRecord {
                key_code,
                binding: binding.to_string(),
            })
            .collect(),
    }
}

impl Default for ControlsProfile {
    fn default() -> Self {
        Self::new(0, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tapdeck_core::{Direction, GamepadButton, KeyCode, Stick};

    const VIEWPORT: Size = Size::new(1000.0, 500.0);

    const PROFILE: &str = r#"{
        "id": 3,
        "name": "Shooter",
        "cursorSpeed": 1.5,
        "elements": [
            {"type": "BUTTON", "shape": "CIRCLE", "toggleSwitch": false, "x": 0.5, "y": 0.5,
             "scale": 1.0, "text": "Jump", "iconId": 0, "bindings": ["KEY_SPACE", "NONE", "NONE", "NONE"]},
            {"type": "HOLOGRAM", "shape": "CIRCLE", "x": 0.1, "y": 0.1, "bindings": []},
            {"type": "STICK", "shape": "TRIANGLE", "x": 0.2, "y": 0.8, "scale": 1.0,
             "bindings": ["GAMEPAD_LEFT_THUMB_UP", "GAMEPAD_LEFT_THUMB_RIGHT",
                          "GAMEPAD_LEFT_THUMB_DOWN", "GAMEPAD_LEFT_THUMB_LEFT"]},
            {"type": "SHOOTER_MODE", "shape": "CIRCLE", "x": 0.5, "y": 0.05,
             "shooterMovementType": "arrow_keys", "shooterLookType": "gamepad_right_stick",
             "shooterLookSensitivity": 2.0, "bindings": []},
            {"type": "BUTTON", "x": "not a number"}
        ],
        "controllers": [
            {"id": "*", "name": "Any", "controllerBindings": [
                {"keyCode": 96, "binding": "GAMEPAD_BUTTON_A"},
                {"keyCode": -2, "binding": "GAMEPAD_LEFT_THUMB_RIGHT"},
                {"keyCode": 97, "binding": "NOT_A_BINDING"}
            ]},
            {"id": "pad-1", "name": "Pad", "controllerBindings": []}
        ]
    }"#;

    #[test]
    fn test_partial_load() {
        let profile = ControlsProfile::from_json(PROFILE, VIEWPORT).unwrap();
        assert_eq!(profile.id(), 3);
        assert_eq!(profile.name(), "Shooter");
        assert_eq!(profile.cursor_speed(), 1.5);
        assert_eq!(profile.elements().len(), 3);
        assert!(profile.is_virtual_gamepad());

        let types: Vec<_> = profile
            .elements()
            .iter()
            .map(|(_, e)| e.element_type())
            .collect();
        assert_eq!(
            types,
            vec![ElementType::Button, ElementType::Stick, ElementType::ShooterMode]
        );

        let (_, button) = profile.elements().iter().next().unwrap();
        assert_eq!(button.position(), Point::new(500.0, 250.0));
        assert_eq!(button.binding_at(0), Some(Binding::Key(KeyCode::SPACE)));
        assert_eq!(button.binding_at(1), None);
        assert_eq!(button.text(), "Jump");

        let (_, stick) = profile.elements().iter().nth(1).unwrap();
        assert_eq!(stick.shape(), Shape::Circle);

        let (_, shooter) = profile.elements().iter().nth(2).unwrap();
        assert_eq!(shooter.shooter_config().movement, MovementType::ArrowKeys);
        assert_eq!(shooter.shooter_config().look, LookType::GamepadRightStick);
        assert_eq!(shooter.shooter_config().look_sensitivity, 2.0);
        assert_eq!(shooter.shooter_config().joystick_size, 1.0);
    }

    #[test]
    fn test_bad_optional_field_keeps_element() {
        let json = r#"{
            "id": 4,
            "name": "Sloppy",
            "elements": [
                {"type": "BUTTON", "x": 0.5, "y": 0.5, "scale": "big",
                 "toggleSwitch": "yes", "bindings": ["KEY_E"]},
                {"type": "BUTTON", "y": 0.5, "bindings": ["KEY_Q"]}
            ]
        }"#;
        let profile = ControlsProfile::from_json(json, VIEWPORT).unwrap();
        assert_eq!(profile.elements().len(), 1);

        let (_, button) = profile.elements().iter().next().unwrap();
        assert_eq!(button.scale(), 1.0);
        assert!(!button.is_toggle_switch());
        assert_eq!(button.position(), Point::new(500.0, 250.0));
        assert_eq!(button.binding_at(0), Some(Binding::Key(KeyCode::E)));
    }

    #[test]
    fn test_controller_lookup_falls_back_to_wildcard() {
        let profile = ControlsProfile::from_json(PROFILE, VIEWPORT).unwrap();
        assert_eq!(profile.controller("pad-1").map(|c| c.name()), Some("Pad"));

        let any = profile.controller("unknown-device").unwrap();
        assert!(any.is_wildcard());
        assert_eq!(
            any.binding_for(96),
            Some(Binding::GamepadButton(GamepadButton::A))
        );
        assert_eq!(
            any.binding_for(-2),
            Some(Binding::GamepadStick(Stick::Left, Direction::Right))
        );
        assert_eq!(any.binding_for(97), None);
    }

    #[test]
    fn test_whole_document_errors() {
        assert!(matches!(
            ControlsProfile::from_json(PROFILE, Size::ZERO),
            Err(ProfileError::ViewportNotReady)
        ));
        assert!(matches!(
            ControlsProfile::from_json("{", VIEWPORT),
            Err(ProfileError::Json(_))
        ));
        assert!(matches!(
            ControlsProfile::from_json(r#"{"name": "x"}"#, VIEWPORT),
            Err(ProfileError::MissingField("elements"))
        ));
    }

    #[test]
    fn test_save_reload_keeps_elements() {
        let profile = ControlsProfile::from_json(PROFILE, VIEWPORT).unwrap();
        let json = profile.to_json(VIEWPORT).unwrap();
        let reloaded = ControlsProfile::from_json(&json, VIEWPORT).unwrap();

        assert_eq!(reloaded.elements().len(), 3);
        assert_eq!(reloaded.controllers().len(), 2);
        let positions: Vec<_> = reloaded
            .elements()
            .iter()
            .map(|(_, e)| e.position())
            .collect();
        assert_eq!(
            positions,
            vec![
                Point::new(500.0, 250.0),
                Point::new(200.0, 400.0),
                Point::new(500.0, 25.0),
            ]
        );
    }

    #[test]
    fn test_add_controller_reuses_existing() {
        let mut profile = ControlsProfile::new(1, "Template A");
        assert!(profile.is_template());
        profile.add_controller("pad").set_binding(96, Binding::GamepadButton(GamepadButton::B));
        profile.add_controller("pad");
        assert_eq!(profile.controllers().len(), 1);
        assert_eq!(profile.controllers()[0].name(), DEFAULT_CONTROLLER_NAME);
        assert!(profile.remove_controller("pad").is_some());
        assert!(profile.controller("pad").is_none());
    }
}
