//! Parallelogram shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{self, BoxFrame};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A frame sheared so its top edge starts a fifth of the width in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parallelogram {
    pub(crate) id: ShapeId,
    pub frame: BoxFrame,
    pub style: ShapeStyle,
}

impl Parallelogram {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: BoxFrame::new(origin, width, height),
            style: ShapeStyle::default(),
        }
    }

    pub fn vertices(&self) -> [Point; 4] {
        geometry::parallelogram_vertices(&self.frame)
    }
}

impl ShapeTrait for Parallelogram {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.frame.normalized()
    }

    fn hit_test(&self, point: Point) -> bool {
        geometry::point_in_polygon(point, &self.vertices())
    }

    fn to_path(&self) -> BezPath {
        geometry::polygon_path(&self.vertices())
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
