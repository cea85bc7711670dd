//! tapdeck Android Platform
//!
//! Conversion of `MotionEvent`s and `KeyEvent`s into tapdeck touch and
//! controller events.

pub mod input;

pub use input::{
    classify_action, device_key, fold_trigger, nanos_to_ms, touch_event, ActionKind,
    CONTROLLER_DEVICE_PREFIX,
};

#[cfg(target_os = "android")]
pub use input::{convert_controller_motion, convert_key_event, convert_motion_event};

/// Install the tracing subscriber once; `RUST_LOG` selects the filter
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
