//! Scene store: committed shapes, the draft under construction and the selection.

use crate::shapes::{Shape, ShapeId, ShapeStyle, StyleEdit};
use kurbo::Point;

/// Every shape on the canvas, back to front.
///
/// The selection is a [`ShapeId`] that always resolves to a committed shape;
/// operations that remove shapes clear it in the same call.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Committed shapes in insertion order.
    shapes: Vec<Shape>,
    /// Shape being sized by an active draw gesture.
    draft: Option<Shape>,
    /// Currently selected shape.
    selection: Option<ShapeId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape on top of the others.
    ///
    /// Box-kind shapes with zero width or height are dropped and `None` is returned.
    pub fn add_shape(&mut self, shape: Shape) -> Option<ShapeId> {
        if shape.is_degenerate() {
            log::debug!("Discarding degenerate {}", shape.kind().name());
            return None;
        }
        let id = shape.id();
        log::debug!("Committed {} {}", shape.kind().name(), id);
        self.shapes.push(shape);
        Some(id)
    }

    /// Remove the selected shape and clear the selection.
    pub fn remove_selected(&mut self) -> Option<Shape> {
        let id = self.selection.take()?;
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        log::debug!("Removed shape {id}");
        Some(self.shapes.remove(index))
    }

    /// Remove every shape, the draft and the selection together.
    pub fn clear_all(&mut self) {
        self.shapes.clear();
        self.draft = None;
        self.selection = None;
    }

    /// Select a committed shape, or nothing. Unknown ids clear the selection.
    /// Returns true if a shape is selected afterwards.
    pub fn set_selection(&mut self, id: Option<ShapeId>) -> bool {
        self.selection = id.filter(|id| self.get(*id).is_some());
        self.selection.is_some()
    }

    pub fn selection(&self) -> Option<ShapeId> {
        self.selection
    }

    pub fn selected(&self) -> Option<&Shape> {
        self.selection.and_then(|id| self.get(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Shape> {
        let id = self.selection?;
        self.get_mut(id)
    }

    /// Apply a style edit to the selected shape. Returns true if it changed.
    pub fn mutate_selected(&mut self, edit: &StyleEdit) -> bool {
        self.selected_mut()
            .is_some_and(|shape| edit.apply(shape.style_mut()))
    }

    pub fn selected_style(&self) -> Option<&ShapeStyle> {
        self.selected().map(Shape::style)
    }

    /// Topmost committed shape under `point`.
    pub fn hit_test(&self, point: Point) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.hit_test(point))
            .map(Shape::id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    /// Committed shapes, back to front.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn draft(&self) -> Option<&Shape> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Shape> {
        self.draft.as_mut()
    }

    pub fn set_draft(&mut self, draft: Option<Shape>) {
        self.draft = draft;
    }

    pub fn take_draft(&mut self) -> Option<Shape> {
        self.draft.take()
    }
}
