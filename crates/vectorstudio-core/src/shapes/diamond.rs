//! Diamond shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{self, BoxFrame};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rhombus whose corners sit on the midpoints of its frame's sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diamond {
    pub(crate) id: ShapeId,
    pub frame: BoxFrame,
    pub style: ShapeStyle,
}

impl Diamond {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame: BoxFrame::new(origin, width, height),
            style: ShapeStyle::default(),
        }
    }

    /// Top, right, bottom, left.
    pub fn vertices(&self) -> [Point; 4] {
        geometry::diamond_vertices(&self.frame)
    }
}

impl ShapeTrait for Diamond {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_inside_corner_outside() {
        let diamond = Diamond::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(diamond.hit_test(Point::new(50.0, 50.0)));
        // Inside the frame but outside the rhombus
        assert!(!diamond.hit_test(Point::new(5.0, 5.0)));
        assert!(!diamond.hit_test(Point::new(95.0, 95.0)));
    }

    #[test]
    fn test_negative_extents() {
        let diamond = Diamond::new(Point::new(100.0, 100.0), -100.0, -100.0);
        assert!(diamond.hit_test(Point::new(50.0, 50.0)));
    }
}
