//! Android input conversion
//!
//! Converts Android motion and key events to tapdeck events. The decoding
//! rules live in platform-independent functions so they can be tested on the
//! host; the `ndk` adapters only read fields.

use smallvec::SmallVec;
use tapdeck_core::{Pointers, TouchEvent, TouchPointer};

/// Prefix for device ids derived from Android's numeric input device id
pub const CONTROLLER_DEVICE_PREFIX: &str = "android-";

/// Masked `MotionEvent` action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Down,
    PointerDown,
    Move,
    Up,
    PointerUp,
    Cancel,
    /// Hover, scroll and other actions that carry no contact change
    Other,
}

/// Decode `getActionMasked()`
pub fn classify_action(masked: i32) -> ActionKind {
    match masked {
        0 => ActionKind::Down,
        1 => ActionKind::Up,
        2 => ActionKind::Move,
        3 => ActionKind::Cancel,
        5 => ActionKind::PointerDown,
        6 => ActionKind::PointerUp,
        _ => ActionKind::Other,
    }
}

/// Build a touch event from a decoded action.
///
/// `pointers` is every contact in the event, the lifting one included for
/// `Up`. Returns `None` when the action index is out of range.
pub fn touch_event(
    kind: ActionKind,
    action_index: usize,
    pointers: Pointers,
    time_ms: u64,
) -> Option<TouchEvent> {
    match kind {
        ActionKind::Down | ActionKind::PointerDown => {
            let pointer = pointers.get(action_index).copied()?;
            Some(TouchEvent::Down {
                pointer,
                pointers,
                time_ms,
            })
        }
        ActionKind::Move => Some(TouchEvent::Move { pointers, time_ms }),
        ActionKind::Up | ActionKind::PointerUp => {
            let pointer = pointers.get(action_index).copied()?;
            Some(TouchEvent::Up {
                pointer,
                pointers,
                time_ms,
            })
        }
        ActionKind::Cancel => Some(TouchEvent::Cancel { time_ms }),
        ActionKind::Other => None,
    }
}

/// Event timestamps arrive in nanoseconds of uptime
pub fn nanos_to_ms(nanos: i64) -> u64 {
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

/// Controllers report a trigger on either its own axis or the brake/gas axis
pub fn fold_trigger(primary: f32, alternate: f32) -> f32 {
    primary.max(alternate).clamp(0.0, 1.0)
}

pub fn device_key(device_id: i32) -> String {
    format!("{CONTROLLER_DEVICE_PREFIX}{device_id}")
}

fn collect(pointers: impl Iterator<Item = TouchPointer>) -> Pointers {
    let mut out: Pointers = SmallVec::new();
    out.extend(pointers);
    out
}

/// Converts Android MotionEvent to a tapdeck TouchEvent
#[cfg(target_os = "android")]
pub fn convert_motion_event(event: &ndk::event::MotionEvent) -> Option<TouchEvent> {
    use ndk::event::{MotionAction, ToolType as NdkTool};
    use tapdeck_core::ToolType;

    let kind = match event.action() {
        MotionAction::Down => ActionKind::Down,
        MotionAction::PointerDown => ActionKind::PointerDown,
        MotionAction::Move => ActionKind::Move,
        MotionAction::Up => ActionKind::Up,
        MotionAction::PointerUp => ActionKind::PointerUp,
        MotionAction::Cancel => ActionKind::Cancel,
        _ => ActionKind::Other,
    };
    let buttons = event.button_state();
    let secondary = buttons.secondary() || buttons.stylus_primary();

    let pointers = collect((0..event.pointer_count()).map(|i| {
        let p = event.pointer_at_index(i);
        let tool = match p.tool_type() {
            NdkTool::Stylus | NdkTool::Eraser => ToolType::Stylus,
            NdkTool::Mouse => ToolType::Mouse,
            _ => ToolType::Finger,
        };
        let mut pointer = TouchPointer::new(p.pointer_id(), p.x(), p.y())
            .with_tool(tool)
            .with_secondary_button(secondary && tool != ToolType::Finger);
        pointer.pressure = p.pressure();
        pointer.size = p.size();
        pointer
    }));

    touch_event(
        kind,
        event.pointer_index(),
        pointers,
        nanos_to_ms(event.event_time()),
    )
}

/// Converts a gamepad KeyEvent; `has_trigger_axis` comes from the device's
/// motion ranges, which only the Java side can query.
#[cfg(target_os = "android")]
pub fn convert_key_event(
    event: &ndk::event::KeyEvent,
    has_trigger_axis: bool,
) -> Option<tapdeck::ControllerKey> {
    use ndk::event::KeyAction;

    let pressed = match event.action() {
        KeyAction::Down => true,
        KeyAction::Up => false,
        action => {
            tracing::trace!(?action, "key action ignored");
            return None;
        }
    };
    let keycode = u32::from(event.key_code()) as i32;
    Some(
        tapdeck::ControllerKey::new(device_key(event.device_id()), keycode, pressed)
            .with_trigger_axis(has_trigger_axis)
            .with_repeat_count(u32::try_from(event.repeat_count()).unwrap_or(0)),
    )
}

/// Reads one joystick frame from a controller MotionEvent
#[cfg(target_os = "android")]
pub fn convert_controller_motion(event: &ndk::event::MotionEvent) -> tapdeck::ControllerMotion {
    use ndk::event::Axis;
    use tapdeck_core::Vec2;

    let p = event.pointer_at_index(0);
    let mut motion = tapdeck::ControllerMotion::new(device_key(event.device_id()));
    motion.thumb_l = Vec2::new(p.axis_value(Axis::X), p.axis_value(Axis::Y));
    motion.thumb_r = Vec2::new(p.axis_value(Axis::Z), p.axis_value(Axis::Rz));
    motion.trigger_l = fold_trigger(p.axis_value(Axis::Ltrigger), p.axis_value(Axis::Brake));
    motion.trigger_r = fold_trigger(p.axis_value(Axis::Rtrigger), p.axis_value(Axis::Gas));
    motion.hat_x = p.axis_value(Axis::HatX);
    motion.hat_y = p.axis_value(Axis::HatY);
    motion
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_fingers() -> Pointers {
        collect(
            [
                TouchPointer::new(0, 10.0, 20.0),
                TouchPointer::new(3, 200.0, 40.0),
            ]
            .into_iter(),
        )
    }

    #[test]
    fn test_classify_action() {
        assert_eq!(classify_action(0), ActionKind::Down);
        assert_eq!(classify_action(5), ActionKind::PointerDown);
        assert_eq!(classify_action(6), ActionKind::PointerUp);
        assert_eq!(classify_action(7), ActionKind::Other);
    }

    #[test]
    fn test_pointer_up_names_lifting_finger() {
        let event = touch_event(ActionKind::PointerUp, 1, two_fingers(), 42);
        match event {
            Some(TouchEvent::Up {
                pointer,
                pointers,
                time_ms,
            }) => {
                assert_eq!(pointer.id, 3);
                assert_eq!(pointers.len(), 2);
                assert_eq!(time_ms, 42);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_action_index_dropped() {
        assert_eq!(touch_event(ActionKind::Down, 5, two_fingers(), 0), None);
        assert_eq!(touch_event(ActionKind::Other, 0, two_fingers(), 0), None);
        assert_eq!(
            touch_event(ActionKind::Cancel, 0, Pointers::new(), 9),
            Some(TouchEvent::Cancel { time_ms: 9 })
        );
    }

    #[test]
    fn test_time_and_trigger_helpers() {
        assert_eq!(nanos_to_ms(1_500_000_000), 1500);
        assert_eq!(nanos_to_ms(-5), 0);
        assert_eq!(fold_trigger(0.0, 0.6), 0.6);
        assert_eq!(fold_trigger(1.4, 0.0), 1.0);
        assert_eq!(device_key(7), "android-7");
    }
}
