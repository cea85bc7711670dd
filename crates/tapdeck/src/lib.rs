//! tapdeck
//!
//! Input virtualization for touch-only devices driving software that
//! expects a keyboard, mouse or gamepad.
//!
//! An [`InputControlsSurface`] sits between the platform's touch and
//! controller events and a [`DispatchSink`] (the guest's display server and
//! virtual HID layer). It routes each touch to, in order:
//!
//! - **Shooter mode**: dynamic movement and aim joysticks
//! - **On-screen controls**: buttons, d-pads, sticks, trackpads, range buttons
//! - **Gestures**: touchpad or touchscreen style pointer control
//!
//! Physical controllers are mapped through the active profile's binding
//! tables into the same virtual gamepad.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use smallvec::smallvec;
//! use tapdeck::{ControlElement, ControlsProfile, ElementType, InputControlsSurface};
//! use tapdeck::{Binding, KeyCode, RecordingSink, Size, TouchEvent, TouchPointer};
//!
//! let sink = Arc::new(RecordingSink::new());
//! let mut surface = InputControlsSurface::with_sink(sink.clone());
//! surface.set_viewport(Size::new(1280.0, 720.0));
//!
//! let mut profile = ControlsProfile::new(1, "Platformer");
//! profile.elements_mut().add(
//!     ControlElement::new(ElementType::Button)
//!         .with_position(1100.0, 600.0)
//!         .with_binding(0, Binding::Key(KeyCode::SPACE)),
//! );
//! surface.set_profile(Some(profile));
//!
//! let thumb = TouchPointer::new(0, 1100.0, 600.0);
//! surface.handle_touch(&TouchEvent::Down { pointer: thumb, pointers: smallvec![thumb], time_ms: 0 });
//! surface.handle_touch(&TouchEvent::Up { pointer: thumb, pointers: smallvec![thumb], time_ms: 80 });
//! assert_eq!(sink.key_events(), vec![(KeyCode::SPACE, true), (KeyCode::SPACE, false)]);
//! ```

pub mod physical;
pub mod surface;

pub use physical::{ControllerKey, ControllerMotion, PhysicalControllerHandler};
pub use surface::{InputControlsSurface, SaveCallback};

pub use tapdeck_controls::{
    keycode_for_axis, keycodes, Axis, ControlElement, ControlsProfile, ElementId, ElementSet,
    ElementType, ExternalController, InputDispatcher, LookType, MovementType, ProfileError,
    ShooterConfig, WILDCARD,
};
pub use tapdeck_core::{
    Binding, DispatchSink, Direction, GamepadButton, GamepadState, KeyCode, Point, PointerButton,
    RecordingSink, SinkEvent, Size, Stick, ToolType, TouchEvent, TouchPointer, Vec2,
    ViewTransform,
};
pub use tapdeck_gesture::{
    ClickAction, GestureRecognizer, InputMode, MouseEvent, PanAction, TouchGestureConfig,
    ZoomAction,
};
pub use tapdeck_shooter::{ShooterInputController, ShooterSettings};
