//! Two-finger gesture lock
//!
//! Once two fingers are down the gesture is undecided. Pinch and pan motion
//! accumulate until their sum crosses [`LOCK_THRESHOLD_PX`]; the dominant
//! component then locks the gesture for the rest of the contact.

use smallvec::SmallVec;

/// Combined pinch and pan travel that decides the gesture
pub const LOCK_THRESHOLD_PX: f32 = 40.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LockState {
    #[default]
    Idle,
    Undecided,
    Pan,
    Zoom,
}

/// Result of feeding one frame of motion into the lock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockStep {
    /// Still under the threshold
    Pending,
    /// Threshold crossed this frame; carries the state it settled in
    Crossed(LockState),
    /// Already decided, or not tracking
    Settled,
}

#[derive(Clone, Debug, Default)]
pub struct TwoFingerLock {
    state: LockState,
    pinch: f32,
    pan: f32,
    transitions: SmallVec<[(LockState, LockState); 4]>,
}

impl TwoFingerLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, LockState::Pan | LockState::Zoom)
    }

    /// Accumulated `(pinch, pan)` travel since [`begin`](Self::begin)
    pub fn accumulated(&self) -> (f32, f32) {
        (self.pinch, self.pan)
    }

    /// State changes since the last reset, oldest first
    pub fn transitions(&self) -> &[(LockState, LockState)] {
        &self.transitions
    }

    /// Start deciding a fresh two-finger contact
    pub fn begin(&mut self) {
        self.pinch = 0.0;
        self.pan = 0.0;
        self.go(LockState::Undecided);
    }

    /// Feed one frame of pinch and pan travel.
    ///
    /// Zoom wins ties only when pan is disabled; with both kinds disabled the
    /// lock stays undecided past the threshold.
    pub fn accumulate(
        &mut self,
        pinch: f32,
        pan: f32,
        pinch_enabled: bool,
        pan_enabled: bool,
    ) -> LockStep {
        if self.state != LockState::Undecided {
            return LockStep::Settled;
        }
        self.pinch += pinch;
        self.pan += pan;
        if self.pinch + self.pan <= LOCK_THRESHOLD_PX {
            return LockStep::Pending;
        }

        let next = if self.pinch > self.pan && pinch_enabled {
            LockState::Zoom
        } else if pan_enabled {
            LockState::Pan
        } else if pinch_enabled {
            LockState::Zoom
        } else {
            LockState::Undecided
        };
        self.go(next);
        LockStep::Crossed(next)
    }

    pub fn reset(&mut self) {
        self.pinch = 0.0;
        self.pan = 0.0;
        self.state = LockState::Idle;
        self.transitions.clear();
    }

    fn go(&mut self, next: LockState) {
        if next != self.state {
            tracing::trace!(from = ?self.state, to = ?next, "two-finger lock");
            self.transitions.push((self.state, next));
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinch_dominant_locks_zoom() {
        let mut lock = TwoFingerLock::new();
        lock.begin();
        assert_eq!(lock.accumulate(20.0, 5.0, true, true), LockStep::Pending);
        assert_eq!(
            lock.accumulate(20.0, 2.0, true, true),
            LockStep::Crossed(LockState::Zoom)
        );
        assert!(lock.is_locked());
    }

    #[test]
    fn test_lock_is_sticky() {
        let mut lock = TwoFingerLock::new();
        lock.begin();
        lock.accumulate(5.0, 50.0, true, true);
        assert_eq!(lock.state(), LockState::Pan);

        // a later pinch-heavy frame changes nothing
        assert_eq!(lock.accumulate(500.0, 0.0, true, true), LockStep::Settled);
        assert_eq!(lock.state(), LockState::Pan);
        assert_eq!(
            lock.transitions(),
            &[
                (LockState::Idle, LockState::Undecided),
                (LockState::Undecided, LockState::Pan)
            ]
        );
    }

    #[test]
    fn test_disabled_kinds() {
        let mut lock = TwoFingerLock::new();
        lock.begin();
        // pinch dominant but disabled: pan takes it
        assert_eq!(
            lock.accumulate(45.0, 1.0, false, true),
            LockStep::Crossed(LockState::Pan)
        );

        lock.reset();
        lock.begin();
        // pan dominant, pan disabled: falls to zoom
        assert_eq!(
            lock.accumulate(1.0, 45.0, true, false),
            LockStep::Crossed(LockState::Zoom)
        );

        lock.reset();
        lock.begin();
        assert_eq!(
            lock.accumulate(30.0, 30.0, false, false),
            LockStep::Crossed(LockState::Undecided)
        );
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_idle_ignores_motion() {
        let mut lock = TwoFingerLock::new();
        assert_eq!(lock.accumulate(100.0, 100.0, true, true), LockStep::Settled);
        assert_eq!(lock.state(), LockState::Idle);
    }
}
