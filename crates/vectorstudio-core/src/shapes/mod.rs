//! Shape definitions for the drawing surface.

mod arrow;
mod circle;
mod diamond;
mod line;
mod oval;
mod parallelogram;
mod rectangle;
mod style;
mod text;

pub use arrow::Arrow;
pub use circle::Circle;
pub use diamond::Diamond;
pub use line::Line;
pub use oval::Oval;
pub use parallelogram::Parallelogram;
pub use rectangle::Rectangle;
pub use style::{
    ColorParseError, DEFAULT_FILL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, SerializableColor,
    ShapeStyle, StyleEdit,
};
pub use text::{FONT_FAMILY, FONT_SIZE, Text};

use crate::geometry::BoxFrame;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the bounding box with non-negative extents.
    fn bounds(&self) -> Rect;

    /// Check if a point hits this shape.
    fn hit_test(&self, point: Point) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// The point a drag moves: box origin, circle centre, line start or text anchor.
    fn origin(&self) -> Point;

    /// Move the origin point without touching extents or a line's end.
    fn set_origin(&mut self, origin: Point);
}

/// Discriminant of [`Shape`], used to pick what a drawing tool creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Oval,
    Diamond,
    Parallelogram,
    Line,
    Arrow,
    Text,
}

impl ShapeKind {
    /// Placed by origin plus signed width and height.
    pub fn is_box(self) -> bool {
        matches!(
            self,
            ShapeKind::Rect | ShapeKind::Oval | ShapeKind::Diamond | ShapeKind::Parallelogram
        )
    }

    /// Drawn with a fill as well as a stroke.
    pub fn is_closed(self) -> bool {
        self.is_box() || self == ShapeKind::Circle
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Oval => "oval",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::Line => "line",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Text => "text",
        }
    }
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rectangle),
    Circle(Circle),
    Oval(Oval),
    Diamond(Diamond),
    Parallelogram(Parallelogram),
    Line(Line),
    Arrow(Arrow),
    Text(Text),
}

impl Shape {
    /// Zero-extent shape of `kind` at `at`, the starting point of a draw
    /// gesture. Text is never drawn by dragging, so it yields `None`.
    pub fn draft(kind: ShapeKind, at: Point, style: ShapeStyle) -> Option<Shape> {
        let mut shape = match kind {
            ShapeKind::Rect => Shape::Rect(Rectangle::new(at, 0.0, 0.0)),
            ShapeKind::Circle => Shape::Circle(Circle::new(at, 0.0)),
            ShapeKind::Oval => Shape::Oval(Oval::new(at, 0.0, 0.0)),
            ShapeKind::Diamond => Shape::Diamond(Diamond::new(at, 0.0, 0.0)),
            ShapeKind::Parallelogram => Shape::Parallelogram(Parallelogram::new(at, 0.0, 0.0)),
            ShapeKind::Line => Shape::Line(Line::new(at, at)),
            ShapeKind::Arrow => Shape::Arrow(Arrow::new(at, at)),
            ShapeKind::Text => return None,
        };
        *shape.style_mut() = style;
        Some(shape)
    }

    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Rect(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Oval(s) => s.id(),
            Shape::Diamond(s) => s.id(),
            Shape::Parallelogram(s) => s.id(),
            Shape::Line(s) => s.id(),
            Shape::Arrow(s) => s.id(),
            Shape::Text(s) => s.id(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rect(_) => ShapeKind::Rect,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Oval(_) => ShapeKind::Oval,
            Shape::Diamond(_) => ShapeKind::Diamond,
            Shape::Parallelogram(_) => ShapeKind::Parallelogram,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Arrow(_) => ShapeKind::Arrow,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Oval(s) => s.bounds(),
            Shape::Diamond(s) => s.bounds(),
            Shape::Parallelogram(s) => s.bounds(),
            Shape::Line(s) => s.bounds(),
            Shape::Arrow(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            Shape::Rect(s) => s.hit_test(point),
            Shape::Circle(s) => s.hit_test(point),
            Shape::Oval(s) => s.hit_test(point),
            Shape::Diamond(s) => s.hit_test(point),
            Shape::Parallelogram(s) => s.hit_test(point),
            Shape::Line(s) => s.hit_test(point),
            Shape::Arrow(s) => s.hit_test(point),
            Shape::Text(s) => s.hit_test(point),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rect(s) => s.to_path(),
            Shape::Circle(s) => s.to_path(),
            Shape::Oval(s) => s.to_path(),
            Shape::Diamond(s) => s.to_path(),
            Shape::Parallelogram(s) => s.to_path(),
            Shape::Line(s) => s.to_path(),
            Shape::Arrow(s) => s.to_path(),
            Shape::Text(s) => s.to_path(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rect(s) => s.style(),
            Shape::Circle(s) => s.style(),
            Shape::Oval(s) => s.style(),
            Shape::Diamond(s) => s.style(),
            Shape::Parallelogram(s) => s.style(),
            Shape::Line(s) => s.style(),
            Shape::Arrow(s) => s.style(),
            Shape::Text(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rect(s) => s.style_mut(),
            Shape::Circle(s) => s.style_mut(),
            Shape::Oval(s) => s.style_mut(),
            Shape::Diamond(s) => s.style_mut(),
            Shape::Parallelogram(s) => s.style_mut(),
            Shape::Line(s) => s.style_mut(),
            Shape::Arrow(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
        }
    }

    pub fn origin(&self) -> Point {
        match self {
            Shape::Rect(s) => s.origin(),
            Shape::Circle(s) => s.origin(),
            Shape::Oval(s) => s.origin(),
            Shape::Diamond(s) => s.origin(),
            Shape::Parallelogram(s) => s.origin(),
            Shape::Line(s) => s.origin(),
            Shape::Arrow(s) => s.origin(),
            Shape::Text(s) => s.origin(),
        }
    }

    pub fn set_origin(&mut self, origin: Point) {
        match self {
            Shape::Rect(s) => s.set_origin(origin),
            Shape::Circle(s) => s.set_origin(origin),
            Shape::Oval(s) => s.set_origin(origin),
            Shape::Diamond(s) => s.set_origin(origin),
            Shape::Parallelogram(s) => s.set_origin(origin),
            Shape::Line(s) => s.set_origin(origin),
            Shape::Arrow(s) => s.set_origin(origin),
            Shape::Text(s) => s.set_origin(origin),
        }
    }

    /// Frame of a box-kind shape.
    pub fn frame(&self) -> Option<&BoxFrame> {
        match self {
            Shape::Rect(s) => Some(&s.frame),
            Shape::Oval(s) => Some(&s.frame),
            Shape::Diamond(s) => Some(&s.frame),
            Shape::Parallelogram(s) => Some(&s.frame),
            Shape::Circle(_) | Shape::Line(_) | Shape::Arrow(_) | Shape::Text(_) => None,
        }
    }

    fn frame_mut(&mut self) -> Option<&mut BoxFrame> {
        match self {
            Shape::Rect(s) => Some(&mut s.frame),
            Shape::Oval(s) => Some(&mut s.frame),
            Shape::Diamond(s) => Some(&mut s.frame),
            Shape::Parallelogram(s) => Some(&mut s.frame),
            Shape::Circle(_) | Shape::Line(_) | Shape::Arrow(_) | Shape::Text(_) => None,
        }
    }

    /// End point of a line or arrow.
    pub fn end_point(&self) -> Option<Point> {
        match self {
            Shape::Line(s) => Some(s.end),
            Shape::Arrow(s) => Some(s.end),
            _ => None,
        }
    }

    /// Move the end point of a line or arrow. Returns false for other kinds.
    pub fn set_end_point(&mut self, end: Point) -> bool {
        match self {
            Shape::Line(s) => s.end = end,
            Shape::Arrow(s) => s.end = end,
            _ => return false,
        }
        true
    }

    /// Stretch a drawn shape so its free corner, rim or end lies at `cursor`.
    /// The origin stays fixed; box extents may turn negative.
    pub fn extend_to(&mut self, cursor: Point) {
        if let Some(frame) = self.frame_mut() {
            frame.width = cursor.x - frame.origin.x;
            frame.height = cursor.y - frame.origin.y;
            return;
        }
        match self {
            Shape::Circle(s) => s.reach(cursor),
            Shape::Line(s) => s.end = cursor,
            Shape::Arrow(s) => s.end = cursor,
            _ => {}
        }
    }

    /// A box-kind shape with zero width or height. Such shapes are never committed.
    pub fn is_degenerate(&self) -> bool {
        self.frame().is_some_and(BoxFrame::is_degenerate)
    }
}
