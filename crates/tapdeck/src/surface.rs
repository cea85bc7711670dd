//! Touch routing for the on-screen controls overlay
//!
//! Every touch is offered, in order, to shooter mode, then to the topmost
//! control element under it, and whatever is left falls through to the
//! gesture recognizer. Pointers claimed by a joystick, the look tracker or
//! an element are stripped from the events the recognizer sees, so a thumb
//! on a d-pad never turns a one-finger drag into a two-finger gesture.
//!
//! In edit mode touches select and drag elements instead.

use std::sync::Arc;

use tapdeck_controls::{ControlElement, ControlsProfile, ElementId, ElementType, InputDispatcher};
use tapdeck_core::{
    round_to, Binding, DispatchSink, Point, PointerButton, Pointers, RecordingSink, Size,
    TouchEvent, TouchPointer, Vec2, ViewTransform,
};
use tapdeck_gesture::{GestureRecognizer, InputMode, MouseEvent};
use tapdeck_shooter::ShooterInputController;
use tracing::{debug, warn};

use crate::physical::{ControllerKey, ControllerMotion, PhysicalControllerHandler};

/// Called with the profile whenever an edit should be persisted
pub type SaveCallback = Box<dyn FnMut(&ControlsProfile) + Send>;

#[derive(Clone, Copy, Debug, Default)]
struct EditState {
    enabled: bool,
    selected: Option<ElementId>,
    /// Touch point minus element position at grab time
    grab: Vec2,
    /// The touch landed on empty space and places the cursor instead
    moving_cursor: bool,
    cursor: Point,
}

pub struct InputControlsSurface {
    profile: Option<ControlsProfile>,
    dispatcher: InputDispatcher,
    gestures: GestureRecognizer,
    shooter: ShooterInputController,
    physical: PhysicalControllerHandler,
    viewport: Size,
    edit: EditState,
    on_save: Option<SaveCallback>,
}

impl Default for InputControlsSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl InputControlsSurface {
    pub fn new() -> Self {
        Self {
            profile: None,
            dispatcher: InputDispatcher::new(),
            gestures: GestureRecognizer::new(),
            shooter: ShooterInputController::new(),
            physical: PhysicalControllerHandler::new(),
            viewport: Size::ZERO,
            edit: EditState::default(),
            on_save: None,
        }
    }

    pub fn with_sink(sink: Arc<dyn DispatchSink>) -> Self {
        let mut surface = Self::new();
        surface.dispatcher.set_sink(Some(sink));
        surface
    }

    pub fn set_sink(&mut self, sink: Option<Arc<dyn DispatchSink>>) {
        self.dispatcher.set_sink(sink);
    }

    /// View size in pixels; sets the element grid to one hundredth of the width
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.shooter.set_viewport(viewport);
        let snap = self.snapping();
        if let Some(profile) = &mut self.profile {
            profile.elements_mut().set_snapping(snap);
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Grid unit in view pixels
    pub fn snapping(&self) -> f32 {
        self.viewport.width / 100.0
    }

    /// Mapping from view space to guest pixels for gesture output
    pub fn set_view_transform(&mut self, xform: ViewTransform) {
        self.gestures.set_transform(xform);
    }

    pub fn profile(&self) -> Option<&ControlsProfile> {
        self.profile.as_ref()
    }

    pub fn profile_mut(&mut self) -> Option<&mut ControlsProfile> {
        self.profile.as_mut()
    }

    /// Swap the active profile, releasing whatever the old one held
    pub fn set_profile(&mut self, profile: Option<ControlsProfile>) {
        self.release_all();
        self.edit.selected = None;
        self.profile = profile;
        let snap = self.snapping();
        if let Some(profile) = &mut self.profile {
            profile.elements_mut().set_snapping(snap);
            self.dispatcher.set_cursor_speed(profile.cursor_speed());
            debug!(name = profile.name(), "profile activated");
        }
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    pub fn gestures_mut(&mut self) -> &mut GestureRecognizer {
        &mut self.gestures
    }

    /// Switch between touchscreen and touchpad interpretation of free fingers
    pub fn set_input_mode(&mut self, mode: InputMode) {
        match self.dispatcher.sink().cloned() {
            Some(sink) => self.gestures.set_mode(mode, sink.as_ref()),
            // nothing was emitted without a sink, so nothing is held
            None => self.gestures.set_mode(mode, &RecordingSink::new()),
        }
    }

    pub fn shooter(&self) -> &ShooterInputController {
        &self.shooter
    }

    pub fn dispatcher(&self) -> &InputDispatcher {
        &self.dispatcher
    }

    pub fn set_on_save(&mut self, callback: Option<SaveCallback>) {
        self.on_save = callback;
    }

    pub fn set_shooter_active(&mut self, active: bool) {
        let Some(profile) = &mut self.profile else {
            return;
        };
        self.shooter
            .set_active(active, profile.elements_mut(), &mut self.dispatcher);
    }

    pub fn set_container_shooter_mode(&mut self, enabled: bool) {
        let Some(profile) = &self.profile else {
            return;
        };
        self.shooter
            .set_container_mode(enabled, profile.elements(), &mut self.dispatcher);
    }

    /// Whether `element` is drawn and hit-tested right now
    pub fn is_element_visible(&self, element: &ControlElement) -> bool {
        !self.shooter.hides_element(element)
    }

    // ---------------------------------------------------------------------
    // Touch routing
    // ---------------------------------------------------------------------

    /// Handle one touch event from the view. Always consumes it.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> bool {
        if self.edit.enabled {
            self.handle_edit_touch(event);
            return true;
        }
        if self.profile.is_none() {
            self.forward_to_gestures(event);
            return true;
        }
        match event {
            TouchEvent::Down {
                pointer, pointers, ..
            } => self.touch_down(event, pointer, pointers),
            TouchEvent::Move { pointers, .. } => self.touch_move(event, pointers),
            TouchEvent::Up {
                pointer, pointers, ..
            } => self.touch_up(event, pointer, pointers),
            TouchEvent::Cancel { .. } => self.cancel(),
        }
        true
    }

    fn touch_down(&mut self, event: &TouchEvent, pointer: &TouchPointer, pointers: &Pointers) {
        let Some(profile) = &mut self.profile else {
            return;
        };
        let point = pointer.position();
        let elements = profile.elements_mut();

        if self
            .shooter
            .touch_down(pointer.id, point, elements, &mut self.dispatcher)
        {
            return;
        }

        // an on-screen left button takes over left clicks from the touchpad
        let left_on_screen = elements
            .iter()
            .any(|(_, e)| e.binding_at(0) == Some(Binding::PointerButton(PointerButton::Left)));
        self.gestures
            .touchpad_mut()
            .set_pointer_button_left_enabled(!left_on_screen);

        let shooter = &self.shooter;
        let hit = elements.hit_test(point, pointer.id, |e| shooter.hides_element(e));
        if let Some(element) = hit.and_then(|id| elements.get_mut(id)) {
            if element.handle_touch_down(pointer.id, point, &mut self.dispatcher) {
                return;
            }
        }

        let pointers = self.unclaimed(pointers);
        self.forward_to_gestures(&TouchEvent::Down {
            pointer: *pointer,
            pointers,
            time_ms: event.time_ms(),
        });
    }

    fn touch_move(&mut self, event: &TouchEvent, pointers: &Pointers) {
        let Some(profile) = &mut self.profile else {
            return;
        };
        let elements = profile.elements_mut();
        let shooter_engaged = self.shooter.is_engaged();
        let mut unhandled = false;

        for pointer in pointers {
            let point = pointer.position();
            if shooter_engaged
                && self
                    .shooter
                    .touch_move(pointer.id, point, elements, &mut self.dispatcher)
            {
                continue;
            }
            let handled = match elements.owner_of(pointer.id) {
                Some(id) => elements
                    .get_mut(id)
                    .is_some_and(|e| e.handle_touch_move(pointer.id, point, &mut self.dispatcher)),
                None => false,
            };
            unhandled |= !handled;
        }

        if unhandled {
            let pointers = self.unclaimed(pointers);
            if !pointers.is_empty() {
                self.forward_to_gestures(&TouchEvent::Move {
                    pointers,
                    time_ms: event.time_ms(),
                });
            }
        }
    }

    fn touch_up(&mut self, event: &TouchEvent, pointer: &TouchPointer, pointers: &Pointers) {
        let Some(profile) = &mut self.profile else {
            return;
        };
        let elements = profile.elements_mut();
        let mut handled = self
            .shooter
            .touch_up(pointer.id, elements, &mut self.dispatcher);
        if let Some(id) = elements.owner_of(pointer.id) {
            if let Some(element) = elements.get_mut(id) {
                handled |= element.handle_touch_up(pointer.id, &mut self.dispatcher);
            }
        }
        if handled {
            return;
        }

        let pointers = self.unclaimed(pointers);
        self.forward_to_gestures(&TouchEvent::Up {
            pointer: *pointer,
            pointers,
            time_ms: event.time_ms(),
        });
    }

    /// Pointers not held by a joystick, the look tracker or an element
    fn unclaimed(&self, pointers: &[TouchPointer]) -> Pointers {
        let claimed = |id: i32| {
            self.shooter.movement().is_owned_by(id)
                || self.shooter.right_joystick().is_owned_by(id)
                || self.shooter.look().is_owned_by(id)
                || self
                    .profile
                    .as_ref()
                    .is_some_and(|p| p.elements().owner_of(id).is_some())
        };
        pointers.iter().filter(|p| !claimed(p.id)).copied().collect()
    }

    fn forward_to_gestures(&mut self, event: &TouchEvent) {
        if let Some(sink) = self.dispatcher.sink().cloned() {
            self.gestures.handle_touch(event, sink.as_ref());
        }
    }

    /// Fire due gesture deadlines
    pub fn poll(&mut self, now_ms: u64) {
        if let Some(sink) = self.dispatcher.sink().cloned() {
            self.gestures.poll(now_ms, sink.as_ref());
        }
    }

    /// External mouse button, motion or wheel
    pub fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        match self.dispatcher.sink().cloned() {
            Some(sink) => self.gestures.handle_mouse(event, sink.as_ref()),
            None => false,
        }
    }

    /// Relative motion from a captured pointer
    pub fn handle_captured_delta(&mut self, dx: f32, dy: f32) {
        if let Some(sink) = self.dispatcher.sink().cloned() {
            self.gestures.handle_captured_delta(dx, dy, sink.as_ref());
        }
    }

    /// Physical controller button; true when bound
    pub fn handle_controller_key(&mut self, key: &ControllerKey) -> bool {
        match &self.profile {
            Some(profile) => self.physical.handle_key(key, profile, &mut self.dispatcher),
            None => false,
        }
    }

    /// Physical controller analog frame; true when the device has bindings
    pub fn handle_controller_motion(&mut self, motion: &ControllerMotion) -> bool {
        match &self.profile {
            Some(profile) => self
                .physical
                .handle_motion(motion, profile, &mut self.dispatcher),
            None => false,
        }
    }

    /// Abandon every touch session and release what it held
    pub fn cancel(&mut self) {
        debug!("touch cancelled");
        self.release_all();
    }

    fn release_all(&mut self) {
        if let Some(profile) = &mut self.profile {
            let elements = profile.elements_mut();
            self.shooter.cancel(elements, &mut self.dispatcher);
            elements.release_all(&mut self.dispatcher);
        }
        self.dispatcher.set_pointer_motion(Vec2::ZERO);
        if let Some(sink) = self.dispatcher.sink().cloned() {
            self.gestures.cancel(sink.as_ref());
        }
    }

    /// Stop the pointer-motion timer; the surface stays usable
    pub fn shutdown(&mut self) {
        self.release_all();
        self.dispatcher.shutdown();
    }

    // ---------------------------------------------------------------------
    // Edit mode
    // ---------------------------------------------------------------------

    pub fn is_edit_mode(&self) -> bool {
        self.edit.enabled
    }

    /// Entering edit mode releases every active input first
    pub fn set_edit_mode(&mut self, enabled: bool) {
        if enabled == self.edit.enabled {
            return;
        }
        if enabled {
            self.release_all();
        }
        debug!(enabled, "edit mode");
        self.edit = EditState {
            enabled,
            cursor: self.edit.cursor,
            ..EditState::default()
        };
    }

    pub fn selected_element(&self) -> Option<ElementId> {
        self.edit.selected
    }

    /// Grid cursor placed by tapping empty space in edit mode
    pub fn edit_cursor(&self) -> Point {
        self.edit.cursor
    }

    /// Add a button at the snapped center of the viewport and select it
    pub fn add_element(&mut self) -> Option<ElementId> {
        if !self.edit.enabled {
            return None;
        }
        let snap = self.snapping();
        let center = Point::new(
            round_to(round_to(self.viewport.width, snap) * 0.5, snap).trunc(),
            round_to(round_to(self.viewport.height, snap) * 0.5, snap).trunc(),
        );
        let profile = self.profile.as_mut()?;
        let id = profile
            .elements_mut()
            .add(ControlElement::new(ElementType::Button).with_position(center.x, center.y));
        profile.refresh_virtual_gamepad();
        self.edit.selected = Some(id);
        self.request_save();
        Some(id)
    }

    /// Remove the selected element
    pub fn remove_element(&mut self) -> bool {
        if !self.edit.enabled {
            return false;
        }
        let (Some(id), Some(profile)) = (self.edit.selected, self.profile.as_mut()) else {
            return false;
        };
        if profile.elements_mut().remove(id).is_none() {
            warn!("selected element no longer in profile");
        }
        profile.refresh_virtual_gamepad();
        self.edit.selected = None;
        self.request_save();
        true
    }

    fn handle_edit_touch(&mut self, event: &TouchEvent) {
        let snap = self.snapping();
        match event {
            TouchEvent::Down { pointer, .. } => {
                let point = pointer.position();
                let hit = self.profile.as_ref().and_then(|p| {
                    let id = p.elements().topmost_at(point)?;
                    Some((id, p.elements().get(id)?.position()))
                });
                match hit {
                    Some((id, position)) => {
                        self.edit.selected = Some(id);
                        self.edit.grab = point.delta_from(position);
                        self.edit.moving_cursor = false;
                    }
                    None => {
                        self.edit.selected = None;
                        self.edit.moving_cursor = true;
                    }
                }
            }
            TouchEvent::Move { pointers, .. } => {
                let (Some(id), Some(pointer)) = (self.edit.selected, pointers.first()) else {
                    return;
                };
                let grab = self.edit.grab;
                let target = Point::new(
                    round_to(pointer.x - grab.x, snap).trunc(),
                    round_to(pointer.y - grab.y, snap).trunc(),
                );
                if let Some(element) = self
                    .profile
                    .as_mut()
                    .and_then(|p| p.elements_mut().get_mut(id))
                {
                    element.set_position(target);
                }
            }
            TouchEvent::Up { pointer, .. } => {
                if self.edit.selected.is_some() {
                    self.request_save();
                }
                if self.edit.moving_cursor {
                    self.edit.cursor = Point::new(
                        round_to(pointer.x, snap).trunc(),
                        round_to(pointer.y, snap).trunc(),
                    );
                }
            }
            TouchEvent::Cancel { .. } => {
                if self.edit.selected.is_some() {
                    self.request_save();
                }
            }
        }
    }

    fn request_save(&mut self) {
        if let (Some(profile), Some(save)) = (&self.profile, &mut self.on_save) {
            save(profile);
        }
    }
}

impl std::fmt::Debug for InputControlsSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputControlsSurface")
            .field("profile", &self.profile.as_ref().map(|p| p.name()))
            .field("dispatcher", &self.dispatcher)
            .field("shooter", &self.shooter)
            .field("viewport", &self.viewport)
            .field("edit_mode", &self.edit.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;
    use std::sync::Mutex;
    use tapdeck_core::{KeyCode, RecordingSink};

    fn surface() -> (InputControlsSurface, Arc<RecordingSink>, ElementId) {
        let sink = Arc::new(RecordingSink::new());
        let mut surface = InputControlsSurface::with_sink(sink.clone());
        surface.set_viewport(Size::new(1000.0, 600.0));
        let mut profile = ControlsProfile::new(1, "Test");
        let jump = profile.elements_mut().add(
            ControlElement::new(ElementType::Button)
                .with_position(900.0, 500.0)
                .with_binding(0, Binding::Key(KeyCode::SPACE)),
        );
        surface.set_profile(Some(profile));
        (surface, sink, jump)
    }

    fn down(id: i32, x: f32, y: f32, time_ms: u64) -> TouchEvent {
        let p = TouchPointer::new(id, x, y);
        TouchEvent::Down {
            pointer: p,
            pointers: smallvec![p],
            time_ms,
        }
    }

    fn up(id: i32, x: f32, y: f32, time_ms: u64) -> TouchEvent {
        let p = TouchPointer::new(id, x, y);
        TouchEvent::Up {
            pointer: p,
            pointers: smallvec![p],
            time_ms,
        }
    }

    #[test]
    fn test_element_touch_does_not_reach_gestures() {
        let (mut surface, sink, _) = surface();
        surface.handle_touch(&down(0, 900.0, 500.0, 0));
        surface.handle_touch(&up(0, 900.0, 500.0, 50));
        surface.poll(100);
        assert_eq!(
            sink.key_events(),
            vec![(KeyCode::SPACE, true), (KeyCode::SPACE, false)]
        );
        assert!(sink.button_events().is_empty());
    }

    #[test]
    fn test_empty_space_falls_through_to_touchpad() {
        let (mut surface, sink, _) = surface();
        surface.handle_touch(&down(0, 300.0, 300.0, 0));
        surface.handle_touch(&up(0, 302.0, 301.0, 60));
        surface.poll(100);
        assert_eq!(
            sink.button_events(),
            vec![(PointerButton::Left, true), (PointerButton::Left, false)]
        );
    }

    #[test]
    fn test_edit_mode_drag_snaps_to_grid_and_saves() {
        let (mut surface, _, jump) = surface();
        let saves = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&saves);
        surface.set_on_save(Some(Box::new(move |_| {
            *counter.lock().unwrap() += 1;
        })));
        surface.set_edit_mode(true);

        surface.handle_touch(&down(0, 905.0, 503.0, 0));
        assert_eq!(surface.selected_element(), Some(jump));
        let moved = TouchPointer::new(0, 777.0, 333.0);
        surface.handle_touch(&TouchEvent::Move {
            pointers: smallvec![moved],
            time_ms: 10,
        });
        surface.handle_touch(&up(0, 777.0, 333.0, 20));

        let position = surface
            .profile()
            .and_then(|p| p.elements().get(jump))
            .map(|e| e.position());
        // 777 - 5 and 333 - 3 snapped to a 10 px grid
        assert_eq!(position, Some(Point::new(770.0, 330.0)));
        assert_eq!(*saves.lock().unwrap(), 1);
    }

    #[test]
    fn test_add_and_remove_in_edit_mode() {
        let (mut surface, _, _) = surface();
        assert_eq!(surface.add_element(), None);
        surface.set_edit_mode(true);

        let id = surface.add_element().expect("edit mode adds");
        assert_eq!(surface.selected_element(), Some(id));
        let position = surface
            .profile()
            .and_then(|p| p.elements().get(id))
            .map(|e| e.position());
        assert_eq!(position, Some(Point::new(500.0, 300.0)));

        assert!(surface.remove_element());
        assert_eq!(surface.profile().map(|p| p.elements().len()), Some(1));
        assert!(!surface.remove_element());
    }

    #[test]
    fn test_entering_edit_mode_releases_held_element() {
        let (mut surface, sink, _) = surface();
        surface.handle_touch(&down(0, 900.0, 500.0, 0));
        surface.set_edit_mode(true);
        assert_eq!(
            sink.key_events(),
            vec![(KeyCode::SPACE, true), (KeyCode::SPACE, false)]
        );
    }
}
