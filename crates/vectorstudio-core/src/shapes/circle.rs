//! Circle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry;
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle placed by its centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    pub center: Point,
    /// Never negative.
    pub radius: f64,
    pub style: ShapeStyle,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius: radius.abs(),
            style: ShapeStyle::default(),
        }
    }

    /// Set the radius so the circle passes through `point`.
    pub fn reach(&mut self, point: Point) {
        self.radius = self.center.distance(point);
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn hit_test(&self, point: Point) -> bool {
        geometry::circle_contains(point, self.center, self.radius)
    }

    fn to_path(&self) -> BezPath {
        KurboCircle::new(self.center, self.radius).to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn origin(&self) -> Point {
        self.center
    }

    fn set_origin(&mut self, origin: Point) {
        self.center = origin;
    }
}
