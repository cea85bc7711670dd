//! tapdeck gesture
//!
//! Turns raw multi-pointer touch streams into pointer and key actions.
//!
//! - **Touchpad mode**: relative cursor, tap to click, two-finger scroll
//! - **Touchscreen mode**: absolute cursor with tap, double-tap, drag,
//!   long-press, and a two-finger pan/pinch that locks in once decided
//! - **Stylus and mouse**: always absolute, regardless of mode
//!
//! Recognizers never read a clock. Every event carries `time_ms`, and
//! deadlines (long-press, deferred releases) fire from `poll(now_ms)`.
//!
//! # Example
//!
//! ```rust
//! use smallvec::smallvec;
//! use tapdeck_core::{PointerButton, RecordingSink, TouchEvent, TouchPointer};
//! use tapdeck_gesture::{GestureRecognizer, InputMode};
//!
//! let sink = RecordingSink::new();
//! let mut gestures = GestureRecognizer::new().with_mode(InputMode::Touchscreen);
//!
//! let finger = TouchPointer::new(0, 200.0, 150.0);
//! gestures.handle_touch(
//!     &TouchEvent::Down { pointer: finger, pointers: smallvec![finger], time_ms: 0 },
//!     &sink,
//! );
//! gestures.handle_touch(
//!     &TouchEvent::Up { pointer: finger, pointers: smallvec![finger], time_ms: 60 },
//!     &sink,
//! );
//! assert_eq!(
//!     sink.button_events(),
//!     vec![(PointerButton::Left, true), (PointerButton::Left, false)]
//! );
//! ```

pub mod config;
pub mod lock;
pub mod recognizer;
pub mod touchpad;
pub mod touchscreen;

pub use config::{ClickAction, PanAction, TouchGestureConfig, ZoomAction};
pub use lock::{LockState, LockStep, TwoFingerLock};
pub use recognizer::{GestureRecognizer, InputMode, MouseEvent};
pub use touchpad::{FourFingerTap, TouchpadRecognizer};
pub use touchscreen::{TouchPhase, TouchscreenRecognizer};
