//! Oval shape, an ellipse inscribed in a box frame.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{self, BoxFrame};
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Oval {
    pub(crate) id: ShapeId,
    /// Bounding frame; the ellipse touches the midpoint of each side.
    pub frame: BoxFrame,
    /// Style properties.
    pub style: ShapeStyle,
}

impl Oval {
    /// Create a new oval.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: BoxFrame::new(origin, width, height),
            style: ShapeStyle::default(),
        }
    }

    /// Get as a kurbo Ellipse.
    pub fn as_ellipse(&self) -> Ellipse {
        Ellipse::new(self.frame.center(), self.frame.radii(), 0.0)
    }
}

impl ShapeTrait for Oval {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.frame.normalized()
    }

    fn hit_test(&self, point: Point) -> bool {
        geometry::ellipse_contains(point, &self.frame)
    }

    fn to_path(&self) -> BezPath {
        self.as_ellipse().to_path(0.1)
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
