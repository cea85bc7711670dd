//! tapdeck core
//!
//! Shared vocabulary for the input-virtualization pipeline:
//!
//! - **Bindings**: semantic actions (keys, pointer buttons, pointer motion,
//!   gamepad buttons and axes) as a tagged enum
//! - **Gamepad state**: the aggregated virtual controller snapshot
//! - **Dispatch sink**: the boundary to the guest input backend
//! - **Touch events**: platform-neutral multi-pointer input with timestamps
//!
//! # Example
//!
//! ```rust
//! use tapdeck_core::{Binding, KeyCode, RecordingSink, DispatchSink};
//!
//! let binding: Binding = "KEY_W".parse().unwrap();
//! assert_eq!(binding, Binding::Key(KeyCode::W));
//!
//! let sink = RecordingSink::new();
//! sink.inject_key(KeyCode::W, true);
//! assert_eq!(sink.key_events(), vec![(KeyCode::W, true)]);
//! ```

pub mod binding;
pub mod error;
pub mod gamepad;
pub mod geometry;
pub mod keycode;
pub mod record;
pub mod sink;
pub mod touch;
pub mod transform;

pub use binding::{Binding, BindingCategory, Direction, GamepadButton, PointerButton, Stick};
pub use error::ParseBindingError;
pub use gamepad::GamepadState;
pub use geometry::{round_away_from_zero, round_to, sign, Point, Rect, Size, Vec2};
pub use keycode::KeyCode;
pub use record::{RecordingSink, SinkEvent};
pub use sink::{DispatchSink, InputHandler, RelativeMouseEvent};
pub use touch::{Pointers, ToolType, TouchEvent, TouchPointer};
pub use transform::ViewTransform;
