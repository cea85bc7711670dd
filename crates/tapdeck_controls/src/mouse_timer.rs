//! Continuous pointer motion
//!
//! Pointer-move bindings do not move the pointer directly. They set a shared
//! offset that a 60 Hz timer thread turns into relative deltas for as long
//! as it stays non-zero.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tapdeck_core::{DispatchSink, Vec2};
use tracing::{debug, trace};

/// Tick period of the motion timer
pub const TICK: Duration = Duration::from_millis(1000 / 60);
/// Offsets shorter than this produce no motion
pub const MOTION_DEAD_ZONE: f32 = 0.08;
/// Pixels per tick at full deflection and unit cursor speed
pub const PIXELS_PER_TICK: f32 = 10.0;

/// Two `f32` components packed into one atomic word.
///
/// Readers always observe a pair written by a single store.
#[derive(Debug, Default)]
pub struct MotionOffset(AtomicU64);

impl MotionOffset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Vec2 {
        let bits = self.0.load(Ordering::Acquire);
        Vec2::new(
            f32::from_bits((bits >> 32) as u32),
            f32::from_bits(bits as u32),
        )
    }

    pub fn store(&self, offset: Vec2) {
        let bits = ((offset.x.to_bits() as u64) << 32) | offset.y.to_bits() as u64;
        self.0.store(bits, Ordering::Release);
    }

    pub fn set_x(&self, x: f32) {
        let current = self.load();
        self.store(Vec2::new(x, current.y));
    }

    pub fn set_y(&self, y: f32) {
        let current = self.load();
        self.store(Vec2::new(current.x, y));
    }

    pub fn clear(&self) {
        self.store(Vec2::ZERO);
    }
}

/// Delta produced by one tick, or `None` inside the dead zone
pub fn tick_delta(offset: Vec2, cursor_speed: f32) -> Option<(i32, i32)> {
    if offset.length() < MOTION_DEAD_ZONE {
        return None;
    }
    let dx = (offset.x * PIXELS_PER_TICK * cursor_speed) as i32;
    let dy = (offset.y * PIXELS_PER_TICK * cursor_speed) as i32;
    Some((dx, dy))
}

/// Handle to the running timer thread; stops and joins on drop
pub struct MouseMoveTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MouseMoveTimer {
    pub fn spawn(
        offset: Arc<MotionOffset>,
        sink: Arc<dyn DispatchSink>,
        cursor_speed: f32,
    ) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("tapdeck-mouse-move".into())
            .spawn(move || {
                while !stop_flag.load(Ordering::Acquire) {
                    if let Some((dx, dy)) = tick_delta(offset.load(), cursor_speed) {
                        if dx != 0 || dy != 0 {
                            trace!(dx, dy, "pointer motion tick");
                            sink.inject_pointer_move_delta(dx, dy);
                        }
                    }
                    thread::park_timeout(TICK);
                }
            })?;

        debug!(cursor_speed, "mouse move timer started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
            debug!("mouse move timer stopped");
        }
    }
}

impl Drop for MouseMoveTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for MouseMoveTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MouseMoveTimer")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tapdeck_core::RecordingSink;

    #[test]
    fn test_offset_packing() {
        let offset = MotionOffset::new();
        assert_eq!(offset.load(), Vec2::ZERO);
        offset.store(Vec2::new(-0.5, 1.0));
        assert_eq!(offset.load(), Vec2::new(-0.5, 1.0));
        offset.set_y(0.25);
        assert_eq!(offset.load(), Vec2::new(-0.5, 0.25));
        offset.clear();
        assert_eq!(offset.load(), Vec2::ZERO);
    }

    #[test]
    fn test_tick_delta() {
        assert_eq!(tick_delta(Vec2::new(0.05, 0.05), 1.0), None);
        assert_eq!(tick_delta(Vec2::new(1.0, 0.0), 1.0), Some((10, 0)));
        assert_eq!(tick_delta(Vec2::new(-0.5, 0.25), 2.0), Some((-10, 5)));
        // truncation, not rounding
        assert_eq!(tick_delta(Vec2::new(0.09, 0.0), 1.0), Some((0, 0)));
    }

    #[test]
    fn test_timer_injects_until_stopped() {
        let sink = Arc::new(RecordingSink::new());
        let offset = Arc::new(MotionOffset::new());
        offset.store(Vec2::new(1.0, 0.0));

        let timer = MouseMoveTimer::spawn(offset.clone(), sink.clone(), 1.0).unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while sink.total_delta().0 < 20 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        timer.stop();

        let (dx, dy) = sink.total_delta();
        assert!(dx >= 20);
        assert_eq!(dx % 10, 0);
        assert_eq!(dy, 0);

        let after = sink.events().len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(sink.events().len(), after);
    }
}
