//! tapdeck shooter
//!
//! Dynamic joysticks for first-person games on a touchscreen. A finger on
//! the left half spawns a movement stick where it lands; the right half
//! aims, either as drag-to-look pointer motion or as a right-stick joystick.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tapdeck_controls::{ElementSet, InputDispatcher};
//! use tapdeck_core::{Point, RecordingSink, Size, Stick};
//! use tapdeck_shooter::ShooterInputController;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let mut dispatcher = InputDispatcher::with_sink(sink.clone());
//! let mut elements = ElementSet::new();
//! elements.set_snapping(10.0);
//!
//! let mut shooter = ShooterInputController::new();
//! shooter.set_viewport(Size::new(1000.0, 600.0));
//! shooter.set_active(true, &mut elements, &mut dispatcher);
//!
//! // without a shooter-mode element movement is the left gamepad stick
//! shooter.touch_down(0, Point::new(200.0, 400.0), &mut elements, &mut dispatcher);
//! shooter.touch_move(0, Point::new(200.0, 340.0), &elements, &mut dispatcher);
//! assert_eq!(dispatcher.gamepad_state().thumb(Stick::Left).y, -1.0);
//! assert!(sink.key_events().is_empty());
//! ```

pub mod controller;
pub mod joystick;
pub mod look;
pub mod settings;

pub use controller::ShooterInputController;
pub use joystick::{DynamicJoystick, Quadrants};
pub use look::LookTracker;
pub use settings::ShooterSettings;
