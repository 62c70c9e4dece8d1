//! Text label shape.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use crate::geometry;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font size of every label, in pixels.
pub const FONT_SIZE: f64 = 16.0;
/// Font family of every label.
pub const FONT_FAMILY: &str = "Courier New";

/// A single-line label anchored at its baseline start.
///
/// Labels are drawn in the stroke color; the fill color is carried but unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    /// Left end of the baseline.
    pub anchor: Point,
    pub content: String,
    pub style: ShapeStyle,
}

impl Text {
    pub fn new(anchor: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            content,
            style: ShapeStyle::default(),
        }
    }

    /// Estimated rendered width.
    pub fn width(&self) -> f64 {
        geometry::text_width(&self.content)
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        geometry::text_bounds(self.anchor, &self.content)
    }

    fn hit_test(&self, point: Point) -> bool {
        geometry::text_contains(point, self.anchor, &self.content)
    }

    /// Glyphs are drawn by the surface; there is no outline path.
    fn to_path(&self) -> BezPath {
        BezPath::new()
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn origin(&self) -> Point {
        self.anchor
    }

    fn set_origin(&mut self, origin: Point) {
        self.anchor = origin;
    }
}
