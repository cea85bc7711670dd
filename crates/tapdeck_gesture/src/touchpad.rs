//! Relative touchpad emulation
//!
//! The screen behaves like a laptop touchpad: one finger moves the cursor by
//! deltas, a one-finger tap clicks left, a two-finger tap clicks right, two
//! close fingers scroll, and a four-finger tap runs a host callback.
//!
//! Button releases are deferred by [`RELEASE_DELAY_MS`] so a tap's press and
//! release do not land in the same guest frame; [`TouchpadRecognizer::poll`]
//! flushes them.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tapdeck_core::{
    round_away_from_zero, DispatchSink, PointerButton, RelativeMouseEvent, ToolType, TouchEvent,
    TouchPointer, ViewTransform,
};
use tracing::trace;

pub const MAX_FINGERS: i32 = 4;
pub const MAX_TAP_TRAVEL_PX: f32 = 10.0;
pub const MAX_TAP_MS: u64 = 200;
/// Finger distance, normalized to a 1000-unit short side, under which two
/// fingers scroll rather than hold-and-drag
pub const MAX_TWO_FINGER_SCROLL_DISTANCE: f32 = 350.0;
/// Accumulated vertical travel per wheel notch
pub const SCROLL_STEP_PX: f32 = 100.0;
pub const CURSOR_ACCELERATION_THRESHOLD: f32 = 6.0;
pub const CURSOR_ACCELERATION: f32 = 1.5;
pub const RELEASE_DELAY_MS: u64 = 30;

/// Callback run on a four-finger tap
pub type FourFingerTap = Box<dyn FnMut() + Send>;

/// One contact, in guest pixels
#[derive(Clone, Copy, Debug, PartialEq)]
struct Finger {
    start: (i32, i32),
    last: (i32, i32),
    current: (i32, i32),
    touch_time: u64,
}

impl Finger {
    fn new(at: (i32, i32), time_ms: u64) -> Self {
        Self {
            start: at,
            last: at,
            current: at,
            touch_time: time_ms,
        }
    }

    fn update(&mut self, at: (i32, i32)) {
        self.last = self.current;
        self.current = at;
    }

    fn travel(&self) -> f32 {
        let dx = (self.current.0 - self.start.0) as f32;
        let dy = (self.current.1 - self.start.1) as f32;
        dx.hypot(dy)
    }

    fn is_tap(&self, now: u64) -> bool {
        now.saturating_sub(self.touch_time) < MAX_TAP_MS && self.travel() < MAX_TAP_TRAVEL_PX
    }

    /// Cursor delta for the last frame with sensitivity and acceleration
    fn delta(&self, sensitivity: f32) -> (i32, i32) {
        let axis = |now: i32, last: i32| {
            let mut d = (now - last) as f32 * sensitivity;
            if d.abs() > CURSOR_ACCELERATION_THRESHOLD {
                d *= CURSOR_ACCELERATION;
            }
            round_away_from_zero(d)
        };
        (
            axis(self.current.0, self.last.0),
            axis(self.current.1, self.last.1),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingRelease {
    due: u64,
    button: PointerButton,
    relative: bool,
}

pub struct TouchpadRecognizer {
    fingers: FxHashMap<i32, Finger>,
    num_fingers: usize,
    sensitivity: f32,
    move_cursor_to_touchpoint: bool,
    left_enabled: bool,
    right_enabled: bool,
    scroll_accum: f32,
    scrolling: bool,
    left_owner: Option<i32>,
    right_owner: Option<i32>,
    pending: SmallVec<[PendingRelease; 2]>,
    four_finger_tap: Option<FourFingerTap>,
}

impl Default for TouchpadRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchpadRecognizer {
    pub fn new() -> Self {
        Self {
            fingers: FxHashMap::default(),
            num_fingers: 0,
            sensitivity: 1.0,
            move_cursor_to_touchpoint: false,
            left_enabled: true,
            right_enabled: true,
            scroll_accum: 0.0,
            scrolling: false,
            left_owner: None,
            right_owner: None,
            pending: SmallVec::new(),
            four_finger_tap: None,
        }
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn set_move_cursor_to_touchpoint(&mut self, enabled: bool) {
        self.move_cursor_to_touchpoint = enabled;
    }

    pub fn set_pointer_button_left_enabled(&mut self, enabled: bool) {
        self.left_enabled = enabled;
    }

    pub fn set_pointer_button_right_enabled(&mut self, enabled: bool) {
        self.right_enabled = enabled;
    }

    pub fn set_four_finger_tap(&mut self, callback: Option<FourFingerTap>) {
        self.four_finger_tap = callback;
    }

    pub fn finger_count(&self) -> usize {
        self.num_fingers
    }

    pub fn has_pending_release(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn handle(&mut self, event: &TouchEvent, xform: &ViewTransform, sink: &dyn DispatchSink) {
        let now = event.time_ms();
        self.poll(now, sink);
        match event {
            TouchEvent::Down { pointer, .. } => {
                if pointer.id >= MAX_FINGERS || pointer.tool == ToolType::Mouse {
                    return;
                }
                self.scroll_accum = 0.0;
                self.scrolling = false;
                let at = xform.apply_int(pointer.position());
                self.fingers.insert(pointer.id, Finger::new(at, now));
                self.num_fingers += 1;
            }
            TouchEvent::Move { pointers, .. } => {
                if let Some(mouse) = pointers.iter().find(|p| p.tool == ToolType::Mouse) {
                    let (x, y) = xform.apply_int(mouse.position());
                    sink.move_pointer_to(x, y);
                    return;
                }
                self.track(pointers, now, xform, sink);
            }
            TouchEvent::Up { pointer, .. } => {
                if let Some(finger) = self.fingers.get_mut(&pointer.id) {
                    finger.update(xform.apply_int(pointer.position()));
                    self.finger_up(pointer.id, now, sink);
                    self.lift(pointer.id);
                }
            }
            TouchEvent::Cancel { .. } => self.reset(),
        }
    }

    fn track(
        &mut self,
        pointers: &[TouchPointer],
        now: u64,
        xform: &ViewTransform,
        sink: &dyn DispatchSink,
    ) {
        for id in 0..MAX_FINGERS {
            if !self.fingers.contains_key(&id) {
                continue;
            }
            match pointers.iter().find(|p| p.id == id) {
                Some(p) => {
                    let at = xform.apply_int(p.position());
                    if let Some(finger) = self.fingers.get_mut(&id) {
                        finger.update(at);
                    }
                    self.finger_move(id, xform, sink);
                }
                None => {
                    // lifted without an up event
                    self.finger_up(id, now, sink);
                    self.lift(id);
                }
            }
        }
    }

    fn lift(&mut self, id: i32) {
        if self.fingers.remove(&id).is_some() {
            self.num_fingers = self.num_fingers.saturating_sub(1);
        }
    }

    fn other_finger(&self, id: i32) -> Option<Finger> {
        (0..MAX_FINGERS)
            .filter(|other| *other != id)
            .find_map(|other| self.fingers.get(&other).copied())
    }

    fn finger_up(&mut self, id: i32, now: u64, sink: &dyn DispatchSink) {
        let Some(finger) = self.fingers.get(&id).copied() else {
            return;
        };
        match self.num_fingers {
            1 => {
                if finger.is_tap(now) {
                    if self.move_cursor_to_touchpoint {
                        sink.inject_pointer_move(finger.current.0, finger.current.1);
                    }
                    self.press(PointerButton::Left, id, sink);
                }
            }
            2 => {
                if self.other_finger(id).is_some() && finger.is_tap(now) {
                    self.press(PointerButton::Right, id, sink);
                }
            }
            4 => {
                if let Some(callback) = self.four_finger_tap.as_mut() {
                    if self.fingers.values().any(|f| !f.is_tap(now)) {
                        return;
                    }
                    trace!("four-finger tap");
                    callback();
                }
            }
            _ => {}
        }
        self.release(PointerButton::Left, id, now, sink);
        self.release(PointerButton::Right, id, now, sink);
    }

    fn finger_move(&mut self, id: i32, xform: &ViewTransform, sink: &dyn DispatchSink) {
        let Some(finger) = self.fingers.get(&id).copied() else {
            return;
        };
        let mut skip_move = false;

        let second = if self.num_fingers == 2 {
            self.other_finger(id)
        } else {
            None
        };
        if let Some(second) = second {
            let scale = 1000.0 / xform.guest_size().min_side();
            let dx = (finger.current.0 - second.current.0) as f32;
            let dy = (finger.current.1 - second.current.1) as f32;
            if dx.hypot(dy) * scale < MAX_TWO_FINGER_SCROLL_DISTANCE {
                let mid = (finger.current.1 + second.current.1) as f32 * 0.5;
                let last_mid = (finger.last.1 + second.last.1) as f32 * 0.5;
                self.scroll_accum += mid - last_mid;
                if self.scroll_accum < -SCROLL_STEP_PX {
                    wheel_notch(PointerButton::ScrollDown, sink);
                    self.scroll_accum = 0.0;
                } else if self.scroll_accum > SCROLL_STEP_PX {
                    wheel_notch(PointerButton::ScrollUp, sink);
                    self.scroll_accum = 0.0;
                }
                self.scrolling = true;
            } else if !sink.is_pointer_button_pressed(PointerButton::Left)
                && second.travel() < MAX_TAP_TRAVEL_PX
            {
                // resting finger plus moving finger: hold and drag
                self.press(PointerButton::Left, id, sink);
                skip_move = true;
            }
        }

        if self.scrolling || self.num_fingers > 2 || skip_move {
            return;
        }
        if self.move_cursor_to_touchpoint && self.num_fingers == 1 {
            sink.inject_pointer_move(finger.current.0, finger.current.1);
        } else {
            let (dx, dy) = finger.delta(self.sensitivity);
            sink.pointer_delta(dx, dy);
        }
    }

    fn press(&mut self, button: PointerButton, id: i32, sink: &dyn DispatchSink) {
        if !self.button_enabled(button) {
            return;
        }
        let owner = match button {
            PointerButton::Right => &mut self.right_owner,
            _ => &mut self.left_owner,
        };
        if sink.is_relative_mouse_movement() {
            sink.send_relative_mouse(RelativeMouseEvent::Button {
                button,
                pressed: true,
            });
            *owner = Some(id);
        } else if !sink.is_pointer_button_pressed(button) {
            sink.inject_pointer_button(button, true);
            *owner = Some(id);
        }
    }

    fn release(&mut self, button: PointerButton, id: i32, now: u64, sink: &dyn DispatchSink) {
        let owner = match button {
            PointerButton::Right => self.right_owner,
            _ => self.left_owner,
        };
        if !self.button_enabled(button) || owner != Some(id) {
            return;
        }
        let relative = sink.is_relative_mouse_movement();
        if relative || sink.is_pointer_button_pressed(button) {
            self.pending.push(PendingRelease {
                due: now + RELEASE_DELAY_MS,
                button,
                relative,
            });
        }
    }

    fn button_enabled(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Right => self.right_enabled,
            _ => self.left_enabled,
        }
    }

    /// Flush deferred releases that are due
    pub fn poll(&mut self, now_ms: u64, sink: &dyn DispatchSink) {
        if self.pending.is_empty() {
            return;
        }
        let (due, waiting): (SmallVec<[PendingRelease; 2]>, _) =
            self.pending.drain(..).partition(|r| now_ms >= r.due);
        self.pending = waiting;
        for release in due {
            if release.relative {
                sink.send_relative_mouse(RelativeMouseEvent::Button {
                    button: release.button,
                    pressed: false,
                });
            } else {
                sink.inject_pointer_button(release.button, false);
            }
            match release.button {
                PointerButton::Right => self.right_owner = None,
                _ => self.left_owner = None,
            }
        }
    }

    /// Forget all contacts; pending releases still fire on the next poll
    pub fn reset(&mut self) {
        self.fingers.clear();
        self.num_fingers = 0;
        self.scroll_accum = 0.0;
        self.scrolling = false;
    }
}

impl std::fmt::Debug for TouchpadRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TouchpadRecognizer")
            .field("fingers", &self.fingers)
            .field("num_fingers", &self.num_fingers)
            .field("sensitivity", &self.sensitivity)
            .field("scrolling", &self.scrolling)
            .field("pending", &self.pending)
            .finish()
    }
}

fn wheel_notch(button: PointerButton, sink: &dyn DispatchSink) {
    sink.inject_pointer_button(button, true);
    sink.inject_pointer_button(button, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tapdeck_core::{RecordingSink, SinkEvent};

    fn down(id: i32, x: f32, y: f32, others: &[TouchPointer], t: u64) -> TouchEvent {
        let p = TouchPointer::new(id, x, y);
        let mut pointers: tapdeck_core::Pointers = others.iter().copied().collect();
        pointers.push(p);
        TouchEvent::Down {
            pointer: p,
            pointers,
            time_ms: t,
        }
    }

    fn up(id: i32, x: f32, y: f32, t: u64) -> TouchEvent {
        let p = TouchPointer::new(id, x, y);
        TouchEvent::Up {
            pointer: p,
            pointers: smallvec![p],
            time_ms: t,
        }
    }

    fn moved(points: &[(i32, f32, f32)], t: u64) -> TouchEvent {
        TouchEvent::Move {
            pointers: points
                .iter()
                .map(|(id, x, y)| TouchPointer::new(*id, *x, *y))
                .collect(),
            time_ms: t,
        }
    }

    #[test]
    fn test_tap_clicks_with_deferred_release() {
        let mut pad = TouchpadRecognizer::new();
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();

        pad.handle(&down(0, 10.0, 10.0, &[], 0), &xf, &sink);
        pad.handle(&up(0, 12.0, 11.0, 100), &xf, &sink);
        assert_eq!(sink.button_events(), vec![(PointerButton::Left, true)]);
        assert!(pad.has_pending_release());

        pad.poll(129, &sink);
        assert_eq!(sink.button_events().len(), 1);
        pad.poll(130, &sink);
        assert_eq!(
            sink.button_events(),
            vec![(PointerButton::Left, true), (PointerButton::Left, false)]
        );
        assert!(!pad.has_pending_release());
    }

    #[test]
    fn test_slow_or_long_touch_is_not_a_tap() {
        let mut pad = TouchpadRecognizer::new();
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();

        pad.handle(&down(0, 10.0, 10.0, &[], 0), &xf, &sink);
        pad.handle(&up(0, 10.0, 10.0, 250), &xf, &sink);
        pad.handle(&down(0, 10.0, 10.0, &[], 300), &xf, &sink);
        pad.handle(&up(0, 40.0, 10.0, 350), &xf, &sink);
        pad.poll(1_000, &sink);
        assert!(sink.button_events().is_empty());
    }

    #[test]
    fn test_one_finger_moves_by_accelerated_delta() {
        let mut pad = TouchpadRecognizer::new();
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();

        pad.handle(&down(0, 100.0, 100.0, &[], 0), &xf, &sink);
        pad.handle(&moved(&[(0, 104.0, 100.0)], 10), &xf, &sink);
        pad.handle(&moved(&[(0, 114.0, 98.0)], 20), &xf, &sink);

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::PointerDelta { dx: 4, dy: 0 },
                // 10px exceeds the threshold: 15
                SinkEvent::PointerDelta { dx: 15, dy: -2 },
            ]
        );
    }

    #[test]
    fn test_two_finger_tap_right_clicks() {
        let mut pad = TouchpadRecognizer::new();
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();

        let first = TouchPointer::new(0, 100.0, 100.0);
        pad.handle(&down(0, 100.0, 100.0, &[], 0), &xf, &sink);
        pad.handle(&down(1, 200.0, 100.0, &[first], 10), &xf, &sink);
        pad.handle(&up(1, 200.0, 100.0, 80), &xf, &sink);
        pad.handle(&up(0, 100.0, 100.0, 90), &xf, &sink);
        pad.poll(200, &sink);

        // the remaining finger was a tap too and clicks left on its own lift
        assert_eq!(
            sink.button_events(),
            vec![
                (PointerButton::Right, true),
                (PointerButton::Left, true),
                (PointerButton::Right, false),
                (PointerButton::Left, false)
            ]
        );
    }

    #[test]
    fn test_two_close_fingers_scroll() {
        let mut pad = TouchpadRecognizer::new();
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();

        let first = TouchPointer::new(0, 100.0, 100.0);
        pad.handle(&down(0, 100.0, 100.0, &[], 0), &xf, &sink);
        pad.handle(&down(1, 150.0, 100.0, &[first], 5), &xf, &sink);
        // both fingers slide up 120px in one frame
        pad.handle(&moved(&[(0, 100.0, -20.0), (1, 150.0, -20.0)], 20), &xf, &sink);

        let buttons = sink.button_events();
        assert_eq!(
            &buttons[..2],
            &[
                (PointerButton::ScrollDown, true),
                (PointerButton::ScrollDown, false)
            ]
        );
        assert_eq!(sink.total_delta(), (0, 0));
    }

    #[test]
    fn test_four_finger_tap_runs_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut pad = TouchpadRecognizer::new();
        pad.set_four_finger_tap(Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();

        let mut present = Vec::new();
        for id in 0..4 {
            let x = 100.0 + id as f32 * 200.0;
            pad.handle(&down(id, x, 300.0, &present, id as u64), &xf, &sink);
            present.push(TouchPointer::new(id, x, 300.0));
        }
        pad.handle(&up(3, 700.0, 300.0, 60), &xf, &sink);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_relative_mode_uses_relative_events() {
        let mut pad = TouchpadRecognizer::new();
        let xf = ViewTransform::default();
        let sink = RecordingSink::relative();

        pad.handle(&down(0, 10.0, 10.0, &[], 0), &xf, &sink);
        pad.handle(&up(0, 10.0, 10.0, 50), &xf, &sink);
        pad.poll(80, &sink);

        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Relative(RelativeMouseEvent::Button {
                    button: PointerButton::Left,
                    pressed: true
                }),
                SinkEvent::Relative(RelativeMouseEvent::Button {
                    button: PointerButton::Left,
                    pressed: false
                }),
            ]
        );
    }

    #[test]
    fn test_disabled_left_button() {
        let mut pad = TouchpadRecognizer::new();
        pad.set_pointer_button_left_enabled(false);
        let xf = ViewTransform::default();
        let sink = RecordingSink::new();
        pad.handle(&down(0, 10.0, 10.0, &[], 0), &xf, &sink);
        pad.handle(&up(0, 10.0, 10.0, 50), &xf, &sink);
        pad.poll(500, &sink);
        assert!(sink.button_events().is_empty());
    }
}
