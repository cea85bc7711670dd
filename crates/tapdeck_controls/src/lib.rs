//! tapdeck controls
//!
//! On-screen control elements, persisted profiles, physical-controller
//! binding tables, and the dispatcher that turns binding activations into
//! sink calls.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tapdeck_controls::{ControlElement, ElementSet, ElementType, InputDispatcher};
//! use tapdeck_core::{Binding, KeyCode, Point, RecordingSink};
//!
//! let sink = Arc::new(RecordingSink::new());
//! let mut dispatcher = InputDispatcher::with_sink(sink.clone());
//!
//! let mut set = ElementSet::new();
//! set.set_snapping(10.0);
//! let jump = set.add(
//!     ControlElement::new(ElementType::Button)
//!         .with_position(100.0, 100.0)
//!         .with_binding(0, Binding::Key(KeyCode::SPACE)),
//! );
//!
//! let element = set.get_mut(jump).unwrap();
//! element.handle_touch_down(0, Point::new(100.0, 100.0), &mut dispatcher);
//! element.handle_touch_up(0, &mut dispatcher);
//! assert_eq!(
//!     sink.key_events(),
//!     vec![(KeyCode::SPACE, true), (KeyCode::SPACE, false)]
//! );
//! ```

pub mod controller;
pub mod dispatch;
pub mod element;
pub mod error;
pub mod mouse_timer;
pub mod profile;
pub mod set;

pub use controller::{
    keycode_for_axis, keycodes, Axis, ExternalController, Resolution, Resolutions, WILDCARD,
};
pub use dispatch::{is_trigger_binding, InputDispatcher};
pub use element::{
    ControlElement, ElementType, LookType, MovementType, Orientation, Range, Shape, ShooterConfig,
    STICK_DEAD_ZONE, STICK_SENSITIVITY,
};
pub use error::{ProfileError, Result};
pub use mouse_timer::{MotionOffset, MouseMoveTimer};
pub use profile::ControlsProfile;
pub use set::{ElementId, ElementSet};
