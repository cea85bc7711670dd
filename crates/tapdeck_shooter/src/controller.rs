//! Shooter-mode touch controller
//!
//! The left half of the viewport spawns a movement joystick, the right half
//! aims. Aiming is either drag-to-look or a second dynamic joystick bound to
//! the right gamepad stick. In container auto-shooter mode a toggle strip at
//! the top center flips the whole mode on and off, and on-screen thumbsticks
//! are hidden because the dynamic joysticks replace them.

use tapdeck_controls::{ControlElement, ElementId, ElementSet, ElementType};
use tapdeck_core::{InputHandler, Point, Rect, Size};
use tracing::debug;

use crate::joystick::{DynamicJoystick, Quadrants};
use crate::look::LookTracker;
use crate::settings::ShooterSettings;

/// Toggle strip width in snaps
pub const TOGGLE_WIDTH_SNAPS: f32 = 12.0;
/// Toggle strip height in snaps
pub const TOGGLE_HEIGHT_SNAPS: f32 = 4.0;
/// Distance of the toggle strip from the top edge in snaps
pub const TOGGLE_TOP_SNAPS: f32 = 0.5;

#[derive(Clone, Debug, Default)]
pub struct ShooterInputController {
    /// Shooter mode currently engaged
    active: bool,
    /// Container auto-shooter mode configured; enables the toggle strip
    container_mode: bool,
    /// Container auto-shooter mode engaged; hides thumbstick elements
    container_runtime: bool,
    viewport: Size,
    snapping: f32,
    movement: DynamicJoystick,
    /// Bindings the movement joystick was claimed with
    movement_bindings: Option<Quadrants>,
    right: DynamicJoystick,
    look: LookTracker,
}

impl ShooterInputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport in view pixels; the grid unit is one hundredth of its width
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.snapping = viewport.width / 100.0;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_container_mode(&self) -> bool {
        self.container_mode
    }

    pub fn is_container_runtime(&self) -> bool {
        self.container_runtime
    }

    /// Whether touches should be offered to this controller at all
    pub fn is_engaged(&self) -> bool {
        self.active || self.container_runtime
    }

    pub fn movement(&self) -> &DynamicJoystick {
        &self.movement
    }

    pub fn right_joystick(&self) -> &DynamicJoystick {
        &self.right
    }

    pub fn look(&self) -> &LookTracker {
        &self.look
    }

    /// Engage or disengage shooter mode.
    ///
    /// Disengaging releases everything the joysticks hold, plus the element
    /// a look finger was firing.
    pub fn set_active(
        &mut self,
        active: bool,
        elements: &mut ElementSet,
        handler: &mut dyn InputHandler,
    ) {
        if self.active == active {
            return;
        }
        debug!(active, "shooter mode");
        self.active = active;
        if !active {
            self.release_movement(handler);
            self.release_look(elements, handler);
            self.release_right(elements, handler);
        }
    }

    /// Configure container auto-shooter mode; engages it immediately
    pub fn set_container_mode(
        &mut self,
        enabled: bool,
        elements: &ElementSet,
        handler: &mut dyn InputHandler,
    ) {
        debug!(enabled, "container shooter mode");
        self.container_mode = enabled;
        self.set_container_runtime(enabled, elements, handler);
    }

    fn set_container_runtime(
        &mut self,
        runtime: bool,
        elements: &ElementSet,
        handler: &mut dyn InputHandler,
    ) {
        if self.container_runtime && !runtime {
            self.release_movement(handler);
            self.release_right(elements, handler);
        }
        self.container_runtime = runtime;
    }

    /// The top-center strip that flips container shooter mode
    pub fn toggle_rect(&self) -> Rect {
        let width = self.snapping * TOGGLE_WIDTH_SNAPS;
        Rect::new(
            self.viewport.width / 2.0 - width / 2.0,
            self.snapping * TOGGLE_TOP_SNAPS,
            width,
            self.snapping * TOGGLE_HEIGHT_SNAPS,
        )
    }

    /// Thumbstick elements are replaced by the dynamic joysticks while
    /// container shooter mode runs
    pub fn hides_element(&self, element: &ControlElement) -> bool {
        self.container_runtime && element.is_thumbstick()
    }

    pub fn settings(&self, elements: &ElementSet) -> ShooterSettings {
        ShooterSettings::from_elements(elements, self.container_runtime)
    }

    /// Offer a new touch. Returns true when the touch was consumed.
    pub fn touch_down(
        &mut self,
        pointer: i32,
        point: Point,
        elements: &mut ElementSet,
        handler: &mut dyn InputHandler,
    ) -> bool {
        if self.container_mode && self.toggle_rect().contains(point) {
            let runtime = !self.container_runtime;
            debug!(runtime, "container shooter toggle");
            self.set_container_runtime(runtime, elements, handler);
            return true;
        }

        let container_runtime = self.container_runtime;
        let hit = elements.hit_test(point, pointer, |e| {
            container_runtime && e.is_thumbstick()
        });

        // a shooter-mode element flips the mode even while disengaged
        if let Some(id) = hit {
            if let Some(element) = elements.get_mut(id) {
                if element.element_type() == ElementType::ShooterMode {
                    element.handle_touch_down(pointer, point, handler);
                    let active = !self.active;
                    self.set_active(active, elements, handler);
                    return true;
                }
            }
        }
        if !self.is_engaged() {
            return false;
        }

        let settings = self.settings(elements);
        if let Some(id) = hit {
            let Some(element) = elements.get_mut(id) else {
                return false;
            };
            element.handle_touch_down(pointer, point, handler);
            if settings.uses_right_stick() {
                self.right.claim(pointer, point);
            } else {
                self.look.claim(pointer, point, Some(id));
            }
            return true;
        }

        if point.x < self.viewport.width / 2.0 {
            if self.movement.claim(pointer, point) {
                debug!(pointer, "movement joystick claimed");
                self.movement_bindings = Some(settings.movement_bindings());
                return true;
            }
            false
        } else if settings.uses_right_stick() {
            let claimed = self.right.claim(pointer, point);
            if claimed {
                debug!(pointer, "right joystick claimed");
            }
            claimed
        } else {
            let claimed = self.look.claim(pointer, point, None);
            if claimed {
                debug!(pointer, "look claimed");
            }
            claimed
        }
    }

    /// Feed a move for `pointer`. Returns true when a joystick or the look
    /// tracker consumed it.
    pub fn touch_move(
        &mut self,
        pointer: i32,
        point: Point,
        elements: &ElementSet,
        handler: &mut dyn InputHandler,
    ) -> bool {
        if !self.is_engaged() {
            return false;
        }
        let settings = self.settings(elements);
        let radius = settings.radius(self.snapping);
        let mut consumed = false;

        if self.movement.is_owned_by(pointer) {
            let bindings = self
                .movement_bindings
                .unwrap_or_else(|| settings.movement_bindings());
            self.movement.update(point, radius, &bindings, handler);
            consumed = true;
        }
        if self.right.is_owned_by(pointer) {
            self.right
                .update(point, radius, &settings.right_stick_bindings(), handler);
            consumed = true;
        }
        if self.look.is_owned_by(pointer) {
            self.look.update(point, settings.look_sensitivity, handler);
            consumed = true;
        }
        consumed
    }

    /// Lift of `pointer`. Element ownership is left to the caller.
    pub fn touch_up(
        &mut self,
        pointer: i32,
        elements: &ElementSet,
        handler: &mut dyn InputHandler,
    ) -> bool {
        let mut consumed = false;
        if self.movement.is_owned_by(pointer) {
            self.release_movement(handler);
            consumed = true;
        }
        if self.right.is_owned_by(pointer) {
            self.release_right(elements, handler);
            consumed = true;
        }
        if self.look.is_owned_by(pointer) {
            self.look.release();
            consumed = true;
        }
        consumed
    }

    /// Drop every session, releasing held bindings
    pub fn cancel(&mut self, elements: &mut ElementSet, handler: &mut dyn InputHandler) {
        self.release_movement(handler);
        self.release_look(elements, handler);
        self.release_right(elements, handler);
    }

    fn release_movement(&mut self, handler: &mut dyn InputHandler) {
        if let Some(bindings) = self.movement_bindings.take() {
            self.movement.release(&bindings, handler);
        }
    }

    fn release_right(&mut self, elements: &ElementSet, handler: &mut dyn InputHandler) {
        let bindings = self.settings(elements).right_stick_bindings();
        self.right.release(&bindings, handler);
    }

    fn release_look(&mut self, elements: &mut ElementSet, handler: &mut dyn InputHandler) {
        let pointer = self.look.owner();
        let fire = self.look.release();
        if let (Some(pointer), Some(id)) = (pointer, fire) {
            if let Some(element) = elements.get_mut(id) {
                element.handle_touch_up(pointer, handler);
            }
        }
    }

    /// Element the look finger is firing, if it landed on one
    pub fn fire_element(&self) -> Option<ElementId> {
        self.look.fire_element()
    }
}
