//! Z-ordered element storage
//!
//! Elements are keyed by a stable [`ElementId`]. Draw order is insertion
//! order, so the last element added sits on top and wins hit tests.

use slotmap::{new_key_type, SlotMap};
use tapdeck_core::{InputHandler, Point};

use crate::element::{ControlElement, ElementType};

new_key_type! {
    /// Stable handle to an element in an [`ElementSet`]
    pub struct ElementId;
}

#[derive(Clone, Debug, Default)]
pub struct ElementSet {
    elements: SlotMap<ElementId, ControlElement>,
    /// Bottom to top
    order: Vec<ElementId>,
    snapping: f32,
}

impl ElementSet {
    pub fn new() -> Self {
        Self {
            snapping: 1.0,
            ..Self::default()
        }
    }

    /// Add on top of every existing element
    pub fn add(&mut self, mut element: ControlElement) -> ElementId {
        element.set_snapping(self.snapping);
        let id = self.elements.insert(element);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: ElementId) -> Option<ControlElement> {
        let element = self.elements.remove(id)?;
        self.order.retain(|other| *other != id);
        Some(element)
    }

    pub fn get(&self, id: ElementId) -> Option<&ControlElement> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ControlElement> {
        self.elements.get_mut(id)
    }

    /// Elements from bottom to top
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (ElementId, &ControlElement)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.elements.get(*id).map(|e| (*id, e)))
    }

    /// Ids from bottom to top
    pub fn ids(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
    }

    pub fn snapping(&self) -> f32 {
        self.snapping
    }

    /// Update the grid unit for every element
    pub fn set_snapping(&mut self, snapping: f32) {
        self.snapping = snapping;
        for element in self.elements.values_mut() {
            element.set_snapping(snapping);
        }
    }

    /// Topmost element under `point` that `pointer` may interact with.
    ///
    /// Elements for which `skip` returns true are not considered.
    pub fn hit_test(
        &self,
        point: Point,
        pointer: i32,
        skip: impl Fn(&ControlElement) -> bool,
    ) -> Option<ElementId> {
        self.iter()
            .rev()
            .find(|(_, e)| !skip(e) && e.accepts(pointer) && e.contains(point))
            .map(|(id, _)| id)
    }

    /// Topmost element under `point`, ignoring ownership
    pub fn topmost_at(&self, point: Point) -> Option<ElementId> {
        self.iter()
            .rev()
            .find(|(_, e)| e.contains(point))
            .map(|(id, _)| id)
    }

    /// Element currently driven by `pointer`
    pub fn owner_of(&self, pointer: i32) -> Option<ElementId> {
        self.iter()
            .find(|(_, e)| e.current_pointer() == Some(pointer))
            .map(|(id, _)| id)
    }

    /// First element of the given type, bottom to top
    pub fn find_type(&self, element_type: ElementType) -> Option<ElementId> {
        self.iter()
            .find(|(_, e)| e.element_type() == element_type)
            .map(|(id, _)| id)
    }

    /// Release every held element, top to bottom
    pub fn release_all(&mut self, handler: &mut dyn InputHandler) {
        for id in self.order.iter().rev() {
            if let Some(element) = self.elements.get_mut(*id) {
                element.release(handler);
            }
        }
    }
}
