//! End-to-end input scenarios through the controls surface
//!
//! Each test drives an [`InputControlsSurface`] with raw touch or controller
//! events and checks what reaches the recording sink.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use smallvec::smallvec;
use tapdeck::{
    keycode_for_axis, Axis, Binding, ControlElement, ControllerMotion, ControlsProfile, Direction,
    ElementType, InputControlsSurface, InputMode, KeyCode, LookType, MovementType, PanAction,
    PointerButton, RecordingSink, ShooterConfig, SinkEvent, Size, Stick, TouchEvent,
    TouchGestureConfig, TouchPointer, Vec2, ZoomAction, WILDCARD,
};

const VIEWPORT: Size = Size::new(1000.0, 600.0);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn surface_with(profile: ControlsProfile) -> (InputControlsSurface, Arc<RecordingSink>) {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let mut surface = InputControlsSurface::with_sink(sink.clone());
    surface.set_viewport(VIEWPORT);
    surface.set_profile(Some(profile));
    (surface, sink)
}

fn down(pointer: TouchPointer, others: &[TouchPointer], time_ms: u64) -> TouchEvent {
    let mut pointers = smallvec![];
    pointers.extend_from_slice(others);
    pointers.push(pointer);
    TouchEvent::Down {
        pointer,
        pointers,
        time_ms,
    }
}

fn up(pointer: TouchPointer, others: &[TouchPointer], time_ms: u64) -> TouchEvent {
    let mut pointers = smallvec![];
    pointers.extend_from_slice(others);
    pointers.push(pointer);
    TouchEvent::Up {
        pointer,
        pointers,
        time_ms,
    }
}

fn moved(pointers: &[TouchPointer], time_ms: u64) -> TouchEvent {
    TouchEvent::Move {
        pointers: pointers.iter().copied().collect(),
        time_ms,
    }
}

#[test]
fn test_touchscreen_tap_clicks_once_at_lift_point() {
    let (mut surface, sink) = surface_with(ControlsProfile::new(1, "Empty"));
    surface.set_input_mode(InputMode::Touchscreen);

    surface.handle_touch(&down(TouchPointer::new(0, 500.0, 500.0), &[], 0));
    surface.handle_touch(&up(TouchPointer::new(0, 503.0, 498.0), &[], 100));
    surface.poll(1000);

    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::PointerMove { x: 500, y: 500 },
            SinkEvent::PointerMove { x: 503, y: 498 },
            SinkEvent::PointerButton {
                button: PointerButton::Left,
                pressed: true
            },
            SinkEvent::PointerButton {
                button: PointerButton::Left,
                pressed: false
            },
        ]
    );
}

#[test]
fn test_pinch_zooms_without_pan_keys() {
    let (mut surface, sink) = surface_with(ControlsProfile::new(1, "Empty"));
    surface.set_input_mode(InputMode::Touchscreen);
    surface.gestures_mut().set_config(TouchGestureConfig {
        two_finger_drag_action: PanAction::Wasd,
        pinch_action: ZoomAction::ScrollWheel,
        ..TouchGestureConfig::default()
    });

    let a = TouchPointer::new(0, 400.0, 300.0);
    let b = TouchPointer::new(1, 600.0, 300.0);
    surface.handle_touch(&down(a, &[], 0));
    surface.handle_touch(&down(b, &[a], 10));

    // 60 px of separation over five frames
    let mut time = 10;
    for step in 1..=5 {
        time += 16;
        let spread = 6.0 * step as f32;
        let a = TouchPointer::new(0, 400.0 - spread, 300.0);
        let b = TouchPointer::new(1, 600.0 + spread, 300.0);
        surface.handle_touch(&moved(&[a, b], time));
    }
    let a = TouchPointer::new(0, 370.0, 300.0);
    let b = TouchPointer::new(1, 630.0, 300.0);
    surface.handle_touch(&up(b, &[a], time + 16));
    surface.handle_touch(&up(a, &[], time + 32));

    let zooms = sink
        .button_events()
        .into_iter()
        .filter(|(button, pressed)| *button == PointerButton::ScrollUp && *pressed)
        .count();
    assert!(zooms >= 1);
    let pan_keys = [KeyCode::W, KeyCode::A, KeyCode::S, KeyCode::D];
    assert!(sink
        .key_events()
        .iter()
        .all(|(key, _)| !pan_keys.contains(key)));
}

#[test]
fn test_shooter_movement_presses_single_key() {
    let mut profile = ControlsProfile::new(2, "Shooter");
    profile.elements_mut().add(
        ControlElement::new(ElementType::ShooterMode)
            .with_position(900.0, 80.0)
            .with_shooter_config(ShooterConfig {
                movement: MovementType::Wasd,
                look: LookType::TouchDrag,
                look_sensitivity: 1.0,
                joystick_size: 1.0,
            }),
    );
    let (mut surface, sink) = surface_with(profile);
    surface.set_shooter_active(true);

    let mut finger = TouchPointer::new(0, 200.0, 400.0);
    surface.handle_touch(&down(finger, &[], 0));
    for (i, y) in [380.0, 340.0, 300.0].into_iter().enumerate() {
        finger.y = y;
        surface.handle_touch(&moved(&[finger], 16 * (i as u64 + 1)));
    }
    surface.handle_touch(&up(finger, &[], 100));

    assert_eq!(
        sink.key_events(),
        vec![(KeyCode::W, true), (KeyCode::W, false)]
    );
    assert!(sink.button_events().is_empty());
}

#[test]
fn test_shooter_element_toggles_mode_by_touch() {
    let mut profile = ControlsProfile::new(2, "Shooter");
    profile
        .elements_mut()
        .add(ControlElement::new(ElementType::ShooterMode).with_position(900.0, 80.0));
    let (mut surface, sink) = surface_with(profile);

    let tap = TouchPointer::new(3, 900.0, 80.0);
    surface.handle_touch(&down(tap, &[], 0));
    surface.handle_touch(&up(tap, &[], 50));
    assert!(surface.shooter().is_active());

    // look drag on the right half
    let mut aim = TouchPointer::new(4, 700.0, 300.0);
    surface.handle_touch(&down(aim, &[], 100));
    aim.x = 712.0;
    surface.handle_touch(&moved(&[aim], 116));
    surface.handle_touch(&up(aim, &[], 130));
    assert_eq!(sink.total_delta(), (12, 0));

    surface.handle_touch(&down(tap, &[], 200));
    surface.handle_touch(&up(tap, &[], 250));
    assert!(!surface.shooter().is_active());
}

#[test]
fn test_controller_axis_sets_left_stick() {
    let mut profile = ControlsProfile::new(3, "Pad");
    profile.add_controller(WILDCARD).set_binding(
        keycode_for_axis(Axis::X, 1.0),
        Binding::GamepadStick(Stick::Left, Direction::Right),
    );
    let (mut surface, sink) = surface_with(profile);

    let mut frame = ControllerMotion::new("usb-pad-0");
    frame.thumb_l = Vec2::new(0.9, 0.0);
    assert!(surface.handle_controller_motion(&frame));

    assert_eq!(surface.dispatcher().gamepad_state().thumb(Stick::Left).x, 0.9);
    assert_eq!(sink.gamepad().thumb(Stick::Left).x, 0.9);
    assert!(sink.gamepad_notifications() >= 1);
}

#[test]
fn test_element_finger_hidden_from_touchpad() {
    let mut profile = ControlsProfile::new(4, "Mixed");
    profile
        .elements_mut()
        .add(ControlElement::new(ElementType::DPad).with_position(150.0, 450.0));
    let (mut surface, sink) = surface_with(profile);

    let thumb = TouchPointer::new(0, 150.0, 450.0);
    surface.handle_touch(&down(thumb, &[], 0));

    // a quick tap elsewhere while the d-pad is held is a plain left click
    let tap = TouchPointer::new(1, 700.0, 300.0);
    surface.handle_touch(&down(tap, &[thumb], 20));
    surface.handle_touch(&up(tap, &[thumb], 80));
    surface.poll(200);

    assert_eq!(
        sink.button_events(),
        vec![(PointerButton::Left, true), (PointerButton::Left, false)]
    );
}

#[test]
fn test_loaded_profile_drives_keys() {
    let json = r#"{
        "id": 9,
        "name": "Loaded",
        "cursorSpeed": 1.0,
        "elements": [
            {"type": "BUTTON", "shape": "RECT", "x": 0.9, "y": 0.8, "scale": 1.0,
             "bindings": ["KEY_CTRL_L", "KEY_C", "NONE", "NONE"]}
        ],
        "controllers": []
    }"#;
    let profile = ControlsProfile::from_json(json, VIEWPORT).expect("profile parses");
    let (mut surface, sink) = surface_with(profile);

    let finger = TouchPointer::new(0, 900.0, 480.0);
    surface.handle_touch(&down(finger, &[], 0));
    surface.handle_touch(&up(finger, &[], 40));

    assert_eq!(
        sink.key_events(),
        vec![
            (KeyCode::CTRL_L, true),
            (KeyCode::C, true),
            (KeyCode::C, false),
            (KeyCode::CTRL_L, false),
        ]
    );
}

#[test]
fn test_long_press_released_by_second_finger_and_cancel() {
    let (mut surface, sink) = surface_with(ControlsProfile::new(1, "Empty"));
    surface.set_input_mode(InputMode::Touchscreen);
    surface.gestures_mut().set_config(TouchGestureConfig {
        long_press_enabled: true,
        ..TouchGestureConfig::default()
    });

    let a = TouchPointer::new(0, 500.0, 300.0);
    let b = TouchPointer::new(1, 650.0, 300.0);
    surface.handle_touch(&down(a, &[], 0));
    surface.poll(400);
    surface.handle_touch(&down(b, &[a], 450));
    assert_eq!(
        sink.button_events(),
        vec![(PointerButton::Right, true), (PointerButton::Right, false)]
    );
    surface.handle_touch(&up(b, &[a], 500));
    surface.handle_touch(&up(a, &[], 550));
    surface.poll(2000);
    assert!(!sink.button_events().contains(&(PointerButton::Left, true)));

    // a held long-press does not survive a cancelled touch stream
    sink.clear();
    surface.handle_touch(&down(a, &[], 3000));
    surface.poll(3400);
    surface.handle_touch(&TouchEvent::Cancel { time_ms: 3450 });
    assert_eq!(
        sink.button_events(),
        vec![(PointerButton::Right, true), (PointerButton::Right, false)]
    );
}

#[test]
fn test_idle_controller_keeps_held_pointer_button_motion() {
    let mut profile = ControlsProfile::new(5, "Mouse pad");
    profile.elements_mut().add(
        ControlElement::new(ElementType::Button)
            .with_position(900.0, 480.0)
            .with_binding(0, Binding::PointerMove(Direction::Right)),
    );
    profile.add_controller(WILDCARD).set_binding(
        keycode_for_axis(Axis::X, 1.0),
        Binding::GamepadStick(Stick::Left, Direction::Right),
    );
    let (mut surface, _sink) = surface_with(profile);

    let finger = TouchPointer::new(0, 900.0, 480.0);
    surface.handle_touch(&down(finger, &[], 0));
    assert_eq!(surface.dispatcher().pointer_motion(), Vec2::new(1.0, 0.0));

    assert!(surface.handle_controller_motion(&ControllerMotion::new("usb-pad-0")));
    assert_eq!(surface.dispatcher().pointer_motion(), Vec2::new(1.0, 0.0));

    surface.handle_touch(&up(finger, &[], 100));
    assert_eq!(surface.dispatcher().pointer_motion(), Vec2::ZERO);
    surface.shutdown();
}
