//! Arrow shape: a line with a chevron head at its end.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry::{self, LINE_HIT_TOLERANCE};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    /// Tail.
    pub start: Point,
    /// Head.
    pub end: Point,
    pub style: ShapeStyle,
}

impl Arrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
        }
    }

    /// Tips of the two head arms.
    pub fn head(&self) -> [Point; 2] {
        geometry::arrowhead(self.start, self.end)
    }

    /// Path of the head arms alone, each drawn out from the tip.
    pub fn head_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for tip in self.head() {
            path.move_to(self.end);
            path.line_to(tip);
        }
        path
    }
}

impl ShapeTrait for Arrow {
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
        path.extend(self.head_path().elements().iter().copied());
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
