//! Straight line segment.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{self, LINE_HIT_TOLERANCE};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    /// Only the stroke is drawn.
    pub style: ShapeStyle,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point) -> bool {
        geometry::distance_point_to_segment(point, self.start, self.end) < LINE_HIT_TOLERANCE
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn origin(&self) -> Point {
        self.start
    }

    fn set_origin(&mut self, origin: Point) {
        self.start = origin;
    }
}
