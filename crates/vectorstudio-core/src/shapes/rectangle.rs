//! Rectangle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{self, BoxFrame};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Placement with signed extents.
    pub frame: BoxFrame,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: BoxFrame::new(origin, width, height),
            style: ShapeStyle::default(),
        }
    }

    /// Get the rectangle as a kurbo Rect with non-negative extents.
    pub fn as_rect(&self) -> Rect {
        self.frame.normalized()
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point) -> bool {
        geometry::rect_contains(point, &self.frame)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn origin(&self) -> Point {
        self.frame.origin
    }

    fn set_origin(&mut self, origin: Point) {
        self.frame.origin = origin;
    }
}
