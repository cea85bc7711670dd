//! Direct-touch gesture recognition
//!
//! In touchscreen mode the cursor follows the finger. A single contact maps
//! to tap, double-tap, drag and long-press; two contacts map to a two-finger
//! tap, or lock into either a pan or a pinch-zoom (see [`TwoFingerLock`]).
//!
//! Long-press is a deadline rather than a timer: [`TouchscreenRecognizer::poll`]
//! fires it once `now_ms` reaches the deadline, and every event polls first.

use tapdeck_core::{
    DispatchSink, KeyCode, Point, PointerButton, TouchEvent, TouchPointer, Vec2, ViewTransform,
};
use tracing::{debug, trace};

use crate::config::{
    ClickAction, PanAction, TouchGestureConfig, ZoomAction, DOUBLE_TAP_DISTANCE_PX,
};
use crate::lock::{LockState, LockStep, TwoFingerLock};

/// Raw finger travel tolerated before a touch stops being a tap or long-press
pub const LONG_PRESS_MOVE_TOLERANCE_PX: f32 = 50.0;
/// Pinch distance change that emits one zoom pulse
pub const ZOOM_STEP_PX: f32 = 30.0;
/// Per-axis midpoint motion that counts as panning
pub const PAN_AXIS_THRESHOLD_PX: f32 = 3.0;
/// Combined per-frame motion below which held pan keys are kept as they are
pub const PAN_KEY_MIN_TRAVEL_PX: f32 = 5.0;

/// What the primary contact has turned into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchPhase {
    #[default]
    Idle,
    /// Down, still a tap candidate
    Pressed,
    /// Left button held and following the finger
    Dragging,
    LongPressed,
    /// Double-tap clicks already sent on down
    DoubleTapped,
    /// A second finger joined; single-finger motion is ignored until all lift
    MultiFinger,
}

#[derive(Clone, Copy, Debug, Default)]
struct PanKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

#[derive(Debug, Default)]
pub struct TouchscreenRecognizer {
    phase: TouchPhase,
    anchor: Point,
    moved_beyond: bool,
    long_press_due: Option<u64>,
    /// Button pressed by a long-press that has fired and not been released
    long_press_held: Option<PointerButton>,
    last_tap: Option<(u64, Point)>,

    lock: TwoFingerLock,
    tap_possible: bool,
    two_finger_dragging: bool,
    last0: Point,
    last1: Point,
    pinch_last: f32,
    middle_down: bool,
    pan_keys: PanKeys,
    /// Keys actually pressed for panning, in `left, right, up, down` order
    pan_keycodes: Option<[KeyCode; 4]>,
}

impl TouchscreenRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    /// Deadline of the armed long-press, if any
    pub fn long_press_deadline(&self) -> Option<u64> {
        self.long_press_due
    }

    pub fn handle(
        &mut self,
        event: &TouchEvent,
        config: &TouchGestureConfig,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        self.poll(event.time_ms(), config, sink);
        match event {
            TouchEvent::Down {
                pointer,
                pointers,
                time_ms,
            } => {
                if pointers.len() <= 1 {
                    self.primary_down(pointer, *time_ms, config, xform, sink);
                } else {
                    self.secondary_down(pointers, sink);
                }
            }
            TouchEvent::Move { pointers, .. } => {
                if pointers.len() >= 2 {
                    self.two_finger_move(&pointers[0], &pointers[1], config, xform, sink);
                } else if let Some(p) = pointers.first() {
                    self.primary_move(p, config, xform, sink);
                }
            }
            TouchEvent::Up {
                pointer,
                pointers,
                time_ms,
            } => {
                if pointers.len() >= 2 {
                    self.secondary_up(config, xform, sink);
                } else {
                    self.primary_up(pointer, *time_ms, config, xform, sink);
                }
            }
            TouchEvent::Cancel { .. } => self.cancel(sink),
        }
    }

    /// Fire the long-press if its deadline has passed
    pub fn poll(&mut self, now_ms: u64, config: &TouchGestureConfig, sink: &dyn DispatchSink) {
        if let Some(due) = self.long_press_due {
            if now_ms >= due {
                self.long_press_due = None;
                self.phase = TouchPhase::LongPressed;
                debug!(action = ?config.long_press_action, "long press");
                let button = config.long_press_action.button();
                sink.pointer_button(button, true);
                self.long_press_held = Some(button);
            }
        }
    }

    fn primary_down(
        &mut self,
        pointer: &TouchPointer,
        now: u64,
        config: &TouchGestureConfig,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        self.phase = TouchPhase::Pressed;
        self.moved_beyond = false;
        self.two_finger_dragging = false;
        self.tap_possible = false;
        self.middle_down = false;
        self.long_press_due = None;
        self.lock.reset();
        self.anchor = pointer.position();

        let target = xform.apply(pointer.position());
        let (x, y) = (target.x as i32, target.y as i32);
        sink.move_pointer_to(x, y);

        if config.double_tap_enabled {
            if let Some((time, at)) = self.last_tap {
                let close = Point::new(x as f32, y as f32).distance(at) < DOUBLE_TAP_DISTANCE_PX;
                if now.saturating_sub(time) < config.double_tap_delay && close {
                    trace!(x, y, "double tap");
                    self.phase = TouchPhase::DoubleTapped;
                    self.last_tap = None;
                    sink.click(PointerButton::Left);
                    sink.click(PointerButton::Left);
                    return;
                }
            }
        }

        if config.long_press_enabled {
            self.long_press_due = Some(now + config.long_press_delay);
        }
    }

    fn secondary_down(&mut self, pointers: &[TouchPointer], sink: &dyn DispatchSink) {
        self.long_press_due = None;
        if self.phase == TouchPhase::Dragging {
            sink.pointer_button(PointerButton::Left, false);
        }
        self.release_long_press(sink);
        // a fired long-press or double-tap already was this contact's action
        if !matches!(self.phase, TouchPhase::LongPressed | TouchPhase::DoubleTapped) {
            self.phase = TouchPhase::MultiFinger;
        }

        if let [first, second] = pointers {
            self.tap_possible = true;
            self.two_finger_dragging = false;
            self.lock.begin();
            self.last0 = first.position();
            self.last1 = second.position();
            self.pinch_last = self.last0.distance(self.last1);
        }
    }

    fn primary_move(
        &mut self,
        pointer: &TouchPointer,
        config: &TouchGestureConfig,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        if matches!(
            self.phase,
            TouchPhase::LongPressed | TouchPhase::MultiFinger | TouchPhase::Idle
        ) {
            return;
        }
        if pointer.position().distance(self.anchor) <= LONG_PRESS_MOVE_TOLERANCE_PX {
            return;
        }
        self.long_press_due = None;
        self.moved_beyond = true;

        if self.phase != TouchPhase::Dragging && config.drag_enabled {
            // press where the finger first landed; the cursor catches up next frame
            self.phase = TouchPhase::Dragging;
            sink.pointer_button(PointerButton::Left, true);
            return;
        }

        let (x, y) = xform.apply_int(pointer.position());
        sink.move_pointer_to(x, y);
    }

    fn two_finger_move(
        &mut self,
        p0: &TouchPointer,
        p1: &TouchPointer,
        config: &TouchGestureConfig,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        let (c0, c1) = (p0.position(), p1.position());
        let distance = c0.distance(c1);
        let pan = c0.midpoint(c1).delta_from(self.last0.midpoint(self.last1));

        let step = self.lock.accumulate(
            (distance - self.pinch_last).abs(),
            pan.length(),
            config.pinch_enabled,
            config.two_finger_drag_enabled,
        );
        if let LockStep::Crossed(state) = step {
            debug!(?state, "two-finger gesture decided");
            self.tap_possible = false;
        }

        match self.lock.state() {
            LockState::Zoom => {
                let change = distance - self.pinch_last;
                if change.abs() > ZOOM_STEP_PX {
                    zoom_pulse(&config.pinch_action, change > 0.0, sink);
                    self.pinch_last = distance;
                }
            }
            LockState::Pan => {
                if pan.x.abs() > PAN_AXIS_THRESHOLD_PX || pan.y.abs() > PAN_AXIS_THRESHOLD_PX {
                    self.two_finger_dragging = true;
                    self.pan(&config.two_finger_drag_action, pan, xform, sink);
                }
            }
            LockState::Idle | LockState::Undecided => {}
        }

        self.last0 = c0;
        self.last1 = c1;
    }

    fn pan(&mut self, action: &PanAction, delta: Vec2, xform: &ViewTransform, sink: &dyn DispatchSink) {
        match action {
            PanAction::MiddleMousePan => {
                if !self.middle_down {
                    sink.inject_pointer_button(PointerButton::Middle, true);
                    self.middle_down = true;
                }
                let guest = xform.apply_delta(delta);
                let at = sink.pointer_position();
                sink.move_pointer_to(
                    at.x as i32 + guest.x as i32,
                    at.y as i32 + guest.y as i32,
                );
            }
            PanAction::Wasd | PanAction::ArrowKeys => {
                if let Some(keys) = action.keys() {
                    self.pan_with_keys(delta, keys, sink);
                }
            }
            PanAction::Unknown(_) => {}
        }
    }

    /// Hold the keys matching this frame's direction; a near-stationary frame
    /// keeps whatever is held
    fn pan_with_keys(&mut self, delta: Vec2, keys: [KeyCode; 4], sink: &dyn DispatchSink) {
        if delta.x.abs() + delta.y.abs() < PAN_KEY_MIN_TRAVEL_PX {
            return;
        }
        self.pan_keycodes = Some(keys);
        let [left, right, up, down] = keys;
        let t = PAN_AXIS_THRESHOLD_PX;
        toggle_key(&mut self.pan_keys.left, delta.x < -t, left, sink);
        toggle_key(&mut self.pan_keys.right, delta.x > t, right, sink);
        toggle_key(&mut self.pan_keys.up, delta.y < -t, up, sink);
        toggle_key(&mut self.pan_keys.down, delta.y > t, down, sink);
    }

    fn secondary_up(
        &mut self,
        config: &TouchGestureConfig,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        if self.tap_possible && !self.two_finger_dragging && config.two_finger_tap_enabled {
            let (x, y) = xform.apply_int(self.last0.midpoint(self.last1));
            trace!(x, y, "two-finger tap");
            sink.move_pointer_to(x, y);
            sink.click(config.two_finger_tap_action.button());
        }
        self.release_pan(sink);
        self.two_finger_dragging = false;
        self.tap_possible = false;
        self.lock.reset();
    }

    fn primary_up(
        &mut self,
        pointer: &TouchPointer,
        now: u64,
        config: &TouchGestureConfig,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        self.long_press_due = None;
        let phase = std::mem::take(&mut self.phase);
        let target = xform.apply(pointer.position());
        let guest = Point::new(target.x.trunc(), target.y.trunc());

        match phase {
            TouchPhase::LongPressed => self.release_long_press(sink),
            TouchPhase::Dragging => {
                sink.pointer_button(PointerButton::Left, false);
                self.last_tap = Some((now, target));
            }
            TouchPhase::DoubleTapped | TouchPhase::Idle => {}
            // a contact that stayed put through a two-finger gesture still taps
            TouchPhase::Pressed | TouchPhase::MultiFinger => {
                if config.tap_enabled && !self.moved_beyond {
                    sink.move_pointer_to(guest.x as i32, guest.y as i32);
                    sink.click(ClickAction::LeftClick.button());
                }
                if !self.moved_beyond && (config.tap_enabled || config.double_tap_enabled) {
                    self.last_tap = Some((now, target));
                }
            }
        }
        self.moved_beyond = false;
    }

    /// Release everything held and forget the contact
    pub fn cancel(&mut self, sink: &dyn DispatchSink) {
        self.long_press_due = None;
        if self.phase == TouchPhase::Dragging {
            sink.pointer_button(PointerButton::Left, false);
        }
        self.release_long_press(sink);
        self.release_pan(sink);
        self.phase = TouchPhase::Idle;
        self.moved_beyond = false;
        self.two_finger_dragging = false;
        self.tap_possible = false;
        self.lock.reset();
    }

    fn release_long_press(&mut self, sink: &dyn DispatchSink) {
        if let Some(button) = self.long_press_held.take() {
            sink.pointer_button(button, false);
        }
    }

    fn release_pan(&mut self, sink: &dyn DispatchSink) {
        if let Some([left, right, up, down]) = self.pan_keycodes.take() {
            toggle_key(&mut self.pan_keys.left, false, left, sink);
            toggle_key(&mut self.pan_keys.right, false, right, sink);
            toggle_key(&mut self.pan_keys.up, false, up, sink);
            toggle_key(&mut self.pan_keys.down, false, down, sink);
        }
        if self.middle_down {
            sink.inject_pointer_button(PointerButton::Middle, false);
            self.middle_down = false;
        }
    }
}

fn toggle_key(held: &mut bool, want: bool, key: KeyCode, sink: &dyn DispatchSink) {
    if *held != want {
        sink.inject_key(key, want);
        *held = want;
    }
}

fn zoom_pulse(action: &ZoomAction, zoom_in: bool, sink: &dyn DispatchSink) {
    match action {
        ZoomAction::ScrollWheel => {
            let button = if zoom_in {
                PointerButton::ScrollUp
            } else {
                PointerButton::ScrollDown
            };
            sink.inject_pointer_button(button, true);
            sink.inject_pointer_button(button, false);
        }
        ZoomAction::PlusMinus | ZoomAction::PageUpDown => {
            let key = match (action, zoom_in) {
                (ZoomAction::PlusMinus, true) => KeyCode::EQUAL,
                (ZoomAction::PlusMinus, false) => KeyCode::MINUS,
                (_, true) => KeyCode::PRIOR,
                (_, false) => KeyCode::NEXT,
            };
            sink.inject_key(key, true);
            sink.inject_key(key, false);
        }
        ZoomAction::Unknown(_) => {}
    }
}
