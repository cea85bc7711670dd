//! On-screen control elements
//!
//! A [`ControlElement`] is one configured virtual control: a button, dpad,
//! analog stick, trackpad, scrolling key strip, or the shooter-mode toggle.
//! Each element is owned by at most one pointer at a time; while owned it
//! ignores every other pointer until the owner lifts.

use serde::{Deserialize, Serialize};
use tapdeck_core::{
    round_away_from_zero, sign, Binding, Direction, InputHandler, KeyCode, Point, Rect, Stick,
    Vec2,
};

/// Normalized deflection a dpad needs before a direction engages
pub const DPAD_DEAD_ZONE: f32 = 0.3;
/// Normalized deflection a stick needs before a direction engages
pub const STICK_DEAD_ZONE: f32 = 0.15;
/// Gain applied to analog stick output before clamping
pub const STICK_SENSITIVITY: f32 = 3.0;
/// Per-axis trackpad delta beyond which acceleration applies
pub const CURSOR_ACCELERATION_THRESHOLD: f32 = 6.0;
pub const CURSOR_ACCELERATION: f32 = 1.5;
/// Cells shown at once by a range button
pub const RANGE_VISIBLE_CELLS: usize = 6;

/// Maximum bindings per element, one per stick quadrant
pub const MAX_BINDINGS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Button,
    #[serde(rename = "D_PAD")]
    DPad,
    RangeButton,
    Stick,
    Trackpad,
    ShooterMode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    #[default]
    Circle,
    Rect,
    RoundRect,
    Square,
}

/// Key set cycled by a range button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Range {
    #[default]
    #[serde(rename = "FROM_A_TO_Z")]
    Letters,
    #[serde(rename = "FROM_0_TO_9")]
    Digits,
    #[serde(rename = "FROM_F1_TO_F12")]
    FunctionKeys,
    #[serde(rename = "FROM_NP0_TO_NP9")]
    Keypad,
}

impl Range {
    pub fn keys(self) -> &'static [KeyCode] {
        match self {
            Range::Letters => &KeyCode::LETTERS,
            Range::Digits => &KeyCode::DIGITS,
            Range::FunctionKeys => &KeyCode::FUNCTION_KEYS,
            Range::Keypad => &KeyCode::KEYPAD_DIGITS,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn from_index(index: u8) -> Self {
        if index == 1 {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        }
    }
}

/// Bindings driven by the shooter-mode movement joystick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[default]
    Wasd,
    ArrowKeys,
    GamepadLeftStick,
}

impl MovementType {
    /// Lenient parse; anything unrecognized means WASD
    pub fn from_name(name: &str) -> Self {
        match name {
            "arrow_keys" => MovementType::ArrowKeys,
            "gamepad_left_stick" => MovementType::GamepadLeftStick,
            _ => MovementType::Wasd,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MovementType::Wasd => "wasd",
            MovementType::ArrowKeys => "arrow_keys",
            MovementType::GamepadLeftStick => "gamepad_left_stick",
        }
    }

    /// Bindings in `up, right, down, left` order
    pub fn bindings(self) -> [Binding; 4] {
        match self {
            MovementType::Wasd => {
                Binding::key_quadrants(KeyCode::W, KeyCode::D, KeyCode::S, KeyCode::A)
            }
            MovementType::ArrowKeys => Binding::key_quadrants(
                KeyCode::UP,
                KeyCode::RIGHT,
                KeyCode::DOWN,
                KeyCode::LEFT,
            ),
            MovementType::GamepadLeftStick => Binding::stick_quadrants(Stick::Left),
        }
    }
}

/// How the right side of the screen aims in shooter mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookType {
    /// Finger drag becomes relative pointer motion
    #[default]
    TouchDrag,
    GamepadRightStick,
}

impl LookType {
    pub fn from_name(name: &str) -> Self {
        if name == "gamepad_right_stick" {
            LookType::GamepadRightStick
        } else {
            LookType::TouchDrag
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LookType::TouchDrag => "touch_drag",
            LookType::GamepadRightStick => "gamepad_right_stick",
        }
    }
}

/// Parameters carried by a shooter-mode element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShooterConfig {
    pub movement: MovementType,
    pub look: LookType,
    pub look_sensitivity: f32,
    pub joystick_size: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            movement: MovementType::Wasd,
            look: LookType::TouchDrag,
            look_sensitivity: 1.0,
            joystick_size: 1.0,
        }
    }
}

/// Per-touch bookkeeping; reset whenever the owner releases
#[derive(Clone, Copy, Debug, Default)]
struct TouchSession {
    pointer: Option<i32>,
    states: [bool; MAX_BINDINGS],
    origin: Point,
    last: Point,
    thumb: Option<Point>,
    scrolling: bool,
    scroll_start: f32,
}

/// A configured on-screen control
#[derive(Clone, Debug)]
pub struct ControlElement {
    element_type: ElementType,
    shape: Shape,
    bindings: [Option<Binding>; MAX_BINDINGS],
    toggle_switch: bool,
    /// Latched state of a toggle button
    toggled: bool,
    position: Point,
    scale: f32,
    text: String,
    icon_id: u8,
    range: Range,
    orientation: Orientation,
    scroll_locked: bool,
    scroll_offset: f32,
    shooter: ShooterConfig,
    snapping: f32,
    session: TouchSession,
}

impl ControlElement {
    pub fn new(element_type: ElementType) -> Self {
        let mut element = Self {
            element_type,
            shape: Shape::Circle,
            bindings: [None; MAX_BINDINGS],
            toggle_switch: false,
            toggled: false,
            position: Point::ZERO,
            scale: 1.0,
            text: String::new(),
            icon_id: 0,
            range: Range::Letters,
            orientation: Orientation::Horizontal,
            scroll_locked: false,
            scroll_offset: 0.0,
            shooter: ShooterConfig::default(),
            snapping: 1.0,
            session: TouchSession::default(),
        };
        element.reset_default_bindings();
        element
    }

    /// Sticks default to the left thumb quadrants, dpads to the arrow keys
    fn reset_default_bindings(&mut self) {
        self.bindings = match self.element_type {
            ElementType::Stick => Binding::stick_quadrants(Stick::Left).map(Some),
            ElementType::DPad => {
                Binding::key_quadrants(KeyCode::UP, KeyCode::RIGHT, KeyCode::DOWN, KeyCode::LEFT)
                    .map(Some)
            }
            _ => [None; MAX_BINDINGS],
        };
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_binding(mut self, index: usize, binding: Binding) -> Self {
        self.set_binding(index, Some(binding));
        self
    }

    pub fn with_bindings(mut self, bindings: [Binding; 4]) -> Self {
        self.bindings = bindings.map(Some);
        self
    }

    pub fn with_toggle_switch(mut self, toggle: bool) -> Self {
        self.toggle_switch = toggle;
        self
    }

    pub fn with_range(mut self, range: Range, orientation: Orientation) -> Self {
        self.range = range;
        self.orientation = orientation;
        self
    }

    pub fn with_shooter_config(mut self, config: ShooterConfig) -> Self {
        self.shooter = config;
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Changing type resets bindings to the type's defaults
    pub fn set_element_type(&mut self, element_type: ElementType) {
        if self.element_type != element_type {
            self.element_type = element_type;
            self.reset_default_bindings();
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn binding_at(&self, index: usize) -> Option<Binding> {
        self.bindings.get(index).copied().flatten()
    }

    pub fn set_binding(&mut self, index: usize, binding: Option<Binding>) {
        if let Some(slot) = self.bindings.get_mut(index) {
            *slot = binding;
        }
    }

    pub fn bindings(&self) -> &[Option<Binding>; MAX_BINDINGS] {
        &self.bindings
    }

    pub fn is_toggle_switch(&self) -> bool {
        self.toggle_switch
    }

    pub fn set_toggle_switch(&mut self, toggle: bool) {
        self.toggle_switch = toggle;
    }

    /// Whether a toggle button is currently latched on
    pub fn is_toggled(&self) -> bool {
        self.toggled
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn icon_id(&self) -> u8 {
        self.icon_id
    }

    pub fn set_icon_id(&mut self, icon_id: u8) {
        self.icon_id = icon_id;
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn set_range(&mut self, range: Range) {
        self.range = range;
        self.scroll_offset = 0.0;
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    pub fn shooter_config(&self) -> &ShooterConfig {
        &self.shooter
    }

    pub fn shooter_config_mut(&mut self) -> &mut ShooterConfig {
        &mut self.shooter
    }

    /// Grid unit in pixels; one hundredth of the viewport width
    pub fn set_snapping(&mut self, snapping: f32) {
        self.snapping = snapping;
    }

    /// The pointer currently driving this element
    pub fn current_pointer(&self) -> Option<i32> {
        self.session.pointer
    }

    /// Whether `pointer` may interact with this element
    pub fn accepts(&self, pointer: i32) -> bool {
        self.session.pointer.map_or(true, |owner| owner == pointer)
    }

    /// True when the element has bindings and every one is a gamepad binding
    pub fn is_all_gamepad(&self) -> bool {
        let mut bound = self.bindings.iter().flatten().peekable();
        bound.peek().is_some() && bound.all(|b| b.is_gamepad())
    }

    /// Stick element standing in for a physical thumbstick
    pub fn is_thumbstick(&self) -> bool {
        self.element_type == ElementType::Stick
            && matches!(
                self.binding_at(0),
                Some(Binding::GamepadStick(_, Direction::Up))
            )
    }

    fn range_cell_size(&self) -> f32 {
        self.snapping * 8.0 * self.scale
    }

    fn range_visible_cells(&self) -> usize {
        self.range.keys().len().min(RANGE_VISIBLE_CELLS)
    }

    pub fn bounds(&self) -> Rect {
        let s = self.snapping;
        let (half_w, half_h) = match self.element_type {
            ElementType::Button => match self.shape {
                Shape::Circle | Shape::Square => (s * 4.0, s * 4.0),
                Shape::Rect | Shape::RoundRect => (s * 6.0, s * 3.0),
            },
            ElementType::ShooterMode => (s * 4.0, s * 4.0),
            ElementType::DPad => (s * 7.0, s * 7.0),
            ElementType::Stick => (s * 6.0, s * 6.0),
            ElementType::Trackpad => (s * 8.0, s * 8.0),
            ElementType::RangeButton => {
                let along = s * 4.0 * self.range_visible_cells() as f32;
                match self.orientation {
                    Orientation::Horizontal => (along, s * 4.0),
                    Orientation::Vertical => (s * 4.0, along),
                }
            }
        };
        Rect::from_center(self.position, half_w * self.scale, half_h * self.scale)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Current thumb position of a held stick, for drawing
    pub fn thumb_position(&self) -> Option<Point> {
        self.session.thumb
    }

    pub fn handle_touch_down(
        &mut self,
        pointer: i32,
        point: Point,
        handler: &mut dyn InputHandler,
    ) -> bool {
        if self.session.pointer.is_some() || !self.contains(point) {
            return false;
        }
        self.session = TouchSession {
            pointer: Some(pointer),
            origin: point,
            last: point,
            scroll_start: self.scroll_offset,
            ..TouchSession::default()
        };

        match self.element_type {
            ElementType::Button => {
                if !(self.toggle_switch && self.toggled) {
                    for binding in self.bindings.iter().flatten() {
                        handler.handle_input_event(*binding, true, 0.0);
                    }
                }
            }
            ElementType::DPad | ElementType::Stick => {
                self.update_directional(point, handler);
            }
            ElementType::Trackpad | ElementType::RangeButton | ElementType::ShooterMode => {}
        }
        true
    }

    pub fn handle_touch_move(
        &mut self,
        pointer: i32,
        point: Point,
        handler: &mut dyn InputHandler,
    ) -> bool {
        if self.session.pointer != Some(pointer) {
            return false;
        }
        match self.element_type {
            ElementType::DPad | ElementType::Stick => self.update_directional(point, handler),
            ElementType::Trackpad => {
                let delta = point.delta_from(self.session.last);
                let dx = accelerate(delta.x);
                let dy = accelerate(delta.y);
                if dx != 0 || dy != 0 {
                    handler.move_pointer_by(dx, dy);
                }
            }
            ElementType::RangeButton => self.scroll_range(point),
            ElementType::Button | ElementType::ShooterMode => {}
        }
        self.session.last = point;
        true
    }

    pub fn handle_touch_up(&mut self, pointer: i32, handler: &mut dyn InputHandler) -> bool {
        if self.session.pointer != Some(pointer) {
            return false;
        }
        match self.element_type {
            ElementType::Button => {
                if !self.toggle_switch || self.toggled {
                    for binding in self.bindings.iter().flatten().rev() {
                        handler.handle_input_event(*binding, false, 0.0);
                    }
                }
                if self.toggle_switch {
                    self.toggled = !self.toggled;
                }
            }
            ElementType::DPad | ElementType::Stick => self.release_directions(handler),
            ElementType::RangeButton => {
                if !self.session.scrolling {
                    if let Some(key) = self.range_key_at(self.session.last) {
                        handler.handle_input_event(Binding::Key(key), true, 0.0);
                        handler.handle_input_event(Binding::Key(key), false, 0.0);
                    }
                }
            }
            ElementType::Trackpad | ElementType::ShooterMode => {}
        }
        self.session = TouchSession::default();
        true
    }

    /// Release whatever the owning pointer holds, regardless of who owns it.
    ///
    /// Latched toggle buttons are released too.
    pub fn release(&mut self, handler: &mut dyn InputHandler) {
        match self.element_type {
            ElementType::Button => {
                if self.session.pointer.is_some() || (self.toggle_switch && self.toggled) {
                    for binding in self.bindings.iter().flatten().rev() {
                        handler.handle_input_event(*binding, false, 0.0);
                    }
                }
                self.toggled = false;
            }
            ElementType::DPad | ElementType::Stick => self.release_directions(handler),
            _ => {}
        }
        self.session = TouchSession::default();
    }

    fn release_directions(&mut self, handler: &mut dyn InputHandler) {
        for i in 0..MAX_BINDINGS {
            if self.session.states[i] {
                if let Some(binding) = self.bindings[i] {
                    handler.handle_input_event(binding, false, 0.0);
                }
                self.session.states[i] = false;
            }
        }
        self.session.thumb = None;
    }

    fn update_directional(&mut self, point: Point, handler: &mut dyn InputHandler) {
        let bounds = self.bounds();
        let center = bounds.center();
        let radius = bounds.width() * 0.5;
        if radius <= 0.0 {
            return;
        }

        let (delta, dead_zone) = if self.element_type == ElementType::Stick {
            let local = point.delta_from(center).clamp_length(radius);
            self.session.thumb = Some(center.offset(local));
            (local.scale(1.0 / radius), STICK_DEAD_ZONE)
        } else {
            (point.delta_from(center).scale(1.0 / radius), DPAD_DEAD_ZONE)
        };
        let delta = Vec2::new(delta.x.clamp(-1.0, 1.0), delta.y.clamp(-1.0, 1.0));
        let wanted = direction_states(delta, dead_zone);

        for (i, direction) in Direction::ALL.into_iter().enumerate() {
            let Some(binding) = self.bindings[i] else {
                continue;
            };
            let value = if direction.is_horizontal() {
                delta.x
            } else {
                delta.y
            };

            if self.element_type == ElementType::Stick && binding.is_gamepad() {
                handler.handle_input_event(binding, true, stick_output(value));
                self.session.states[i] = true;
            } else if self.element_type == ElementType::Stick && binding.is_pointer_move() {
                if wanted[i] {
                    handler.handle_input_event(binding, true, value);
                } else if self.session.states[i] {
                    handler.handle_input_event(binding, false, 0.0);
                }
                self.session.states[i] = wanted[i];
            } else if wanted[i] != self.session.states[i] {
                // digital deflection of a stick binding is a full-scale push
                let offset = match binding {
                    Binding::GamepadStick(..) if wanted[i] => direction.sign(),
                    _ => 0.0,
                };
                handler.handle_input_event(binding, wanted[i], offset);
                self.session.states[i] = wanted[i];
            }
        }
    }

    fn scroll_range(&mut self, point: Point) {
        if self.scroll_locked {
            return;
        }
        let travel = match self.orientation {
            Orientation::Horizontal => point.x - self.session.origin.x,
            Orientation::Vertical => point.y - self.session.origin.y,
        };
        if !self.session.scrolling && travel.abs() <= self.snapping {
            return;
        }
        self.session.scrolling = true;
        let cell = self.range_cell_size();
        let hidden = self.range.keys().len().saturating_sub(self.range_visible_cells());
        let max_offset = cell * hidden as f32;
        self.scroll_offset = (self.session.scroll_start - travel).clamp(0.0, max_offset);
    }

    fn range_key_at(&self, point: Point) -> Option<KeyCode> {
        let bounds = self.bounds();
        let cell = self.range_cell_size();
        if cell <= 0.0 {
            return None;
        }
        let along = match self.orientation {
            Orientation::Horizontal => point.x - bounds.x(),
            Orientation::Vertical => point.y - bounds.y(),
        };
        let index = ((along + self.scroll_offset) / cell).floor();
        if index < 0.0 {
            return None;
        }
        self.range.keys().get(index as usize).copied()
    }
}

/// Engaged directions in `up, right, down, left` order
pub fn direction_states(delta: Vec2, dead_zone: f32) -> [bool; 4] {
    [
        delta.y <= -dead_zone,
        delta.x >= dead_zone,
        delta.y >= dead_zone,
        delta.x <= -dead_zone,
    ]
}

/// Analog output for one stick axis: small-offset trim, gain, clamp
pub fn stick_output(value: f32) -> f32 {
    ((value.abs() - 0.01).max(0.0) * sign(value) * STICK_SENSITIVITY).clamp(-1.0, 1.0)
}

/// Trackpad-style acceleration on a per-axis delta
pub fn accelerate(delta: f32) -> i32 {
    let delta = if delta.abs() > CURSOR_ACCELERATION_THRESHOLD {
        delta * CURSOR_ACCELERATION
    } else {
        delta
    };
    round_away_from_zero(delta)
}
