//! Drag-to-look pointer tracking

use tapdeck_controls::ElementId;
use tapdeck_core::{round_away_from_zero, InputHandler, Point};

/// One finger whose per-frame motion becomes relative pointer motion
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookTracker {
    owner: Option<i32>,
    last: Point,
    /// Element the same finger pressed when it landed, if any
    fire_element: Option<ElementId>,
}

impl LookTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<i32> {
        self.owner
    }

    pub fn is_owned_by(&self, pointer: i32) -> bool {
        self.owner == Some(pointer)
    }

    pub fn fire_element(&self) -> Option<ElementId> {
        self.fire_element
    }

    pub fn claim(&mut self, pointer: i32, point: Point, fire_element: Option<ElementId>) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(pointer);
        self.last = point;
        self.fire_element = fire_element;
        true
    }

    /// Emit the motion since the last frame; returns the delta sent
    pub fn update(
        &mut self,
        point: Point,
        sensitivity: f32,
        handler: &mut dyn InputHandler,
    ) -> (i32, i32) {
        let delta = point.delta_from(self.last);
        self.last = point;
        let dx = round_away_from_zero(delta.x * sensitivity);
        let dy = round_away_from_zero(delta.y * sensitivity);
        if dx != 0 || dy != 0 {
            handler.move_pointer_by(dx, dy);
        }
        (dx, dy)
    }

    /// Give up the pointer, returning the element it was firing
    pub fn release(&mut self) -> Option<ElementId> {
        let fire = self.fire_element;
        *self = Self::default();
        fire
    }
}
