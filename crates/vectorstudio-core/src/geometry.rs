//! Geometry kernel: containment and distance tests used by hit testing,
//! rendering and export alike.

use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distance below which a click selects a line or arrow.
pub const LINE_HIT_TOLERANCE: f64 = 10.0;
/// Approximate advance of one label character.
pub const TEXT_CHAR_WIDTH: f64 = 10.0;
/// Label extent above its baseline anchor.
pub const TEXT_ASCENT: f64 = 15.0;
/// Label extent below its baseline anchor.
pub const TEXT_DESCENT: f64 = 5.0;
/// Parallelogram skew as a fraction of its width.
pub const PARALLELOGRAM_SKEW: f64 = 0.2;
/// Length of each arrowhead arm.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Angle between the shaft and each arrowhead arm.
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

/// Origin plus signed extents, the placement of every box-kind shape.
///
/// Width and height keep the sign of the drag that produced them, so the
/// origin is the corner where the gesture started, not necessarily the
/// top-left one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxFrame {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl BoxFrame {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// A frame with zero width or height encloses nothing.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Corner opposite the origin.
    pub fn far_corner(&self) -> Point {
        Point::new(self.origin.x + self.width, self.origin.y + self.height)
    }

    /// Bounds with non-negative extents.
    pub fn normalized(&self) -> Rect {
        Rect::from_points(self.origin, self.far_corner())
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    /// Half extents as absolute values, the radii of the inscribed ellipse.
    pub fn radii(&self) -> Vec2 {
        Vec2::new((self.width / 2.0).abs(), (self.height / 2.0).abs())
    }
}

/// Even-odd ray casting. Points exactly on an edge may land either way.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from a point to the segment a→b.
pub fn distance_point_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Inclusive containment in a frame, tolerant of negative extents.
pub fn rect_contains(point: Point, frame: &BoxFrame) -> bool {
    let r = frame.normalized();
    point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
}

pub fn circle_contains(point: Point, center: Point, radius: f64) -> bool {
    point.distance(center) <= radius
}

/// Containment in the ellipse inscribed in a frame. Zero radii contain nothing.
pub fn ellipse_contains(point: Point, frame: &BoxFrame) -> bool {
    let radii = frame.radii();
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    let c = frame.center();
    let dx = (point.x - c.x) / radii.x;
    let dy = (point.y - c.y) / radii.y;
    dx * dx + dy * dy <= 1.0
}

/// Edge midpoints of a frame: top, right, bottom, left.
pub fn diamond_vertices(frame: &BoxFrame) -> [Point; 4] {
    let BoxFrame {
        origin,
        width: w,
        height: h,
    } = *frame;
    [
        Point::new(origin.x + w / 2.0, origin.y),
        Point::new(origin.x + w, origin.y + h / 2.0),
        Point::new(origin.x + w / 2.0, origin.y + h),
        Point::new(origin.x, origin.y + h / 2.0),
    ]
}

/// Corners of a frame sheared right by a fifth of its width.
pub fn parallelogram_vertices(frame: &BoxFrame) -> [Point; 4] {
    let BoxFrame {
        origin,
        width: w,
        height: h,
    } = *frame;
    let skew = w * PARALLELOGRAM_SKEW;
    [
        Point::new(origin.x + skew, origin.y),
        Point::new(origin.x + w, origin.y),
        Point::new(origin.x + w - skew, origin.y + h),
        Point::new(origin.x, origin.y + h),
    ]
}

/// Closed polygon path through `vertices`.
pub fn polygon_path(vertices: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = vertices.split_first() {
        path.move_to(*first);
        for vertex in rest {
            path.line_to(*vertex);
        }
        path.close_path();
    }
    path
}

/// Tips of the two arrowhead arms drawn back from `end`.
pub fn arrowhead(start: Point, end: Point) -> [Point; 2] {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let arm = |offset: f64| {
        let theta = angle + offset;
        Point::new(
            end.x - ARROW_HEAD_LENGTH * theta.cos(),
            end.y - ARROW_HEAD_LENGTH * theta.sin(),
        )
    };
    [arm(-ARROW_HEAD_ANGLE), arm(ARROW_HEAD_ANGLE)]
}

/// Estimated rendered width of a label.
pub fn text_width(text: &str) -> f64 {
    text.chars().count() as f64 * TEXT_CHAR_WIDTH
}

/// Region a label occupies around its baseline anchor.
pub fn text_bounds(anchor: Point, text: &str) -> Rect {
    Rect::new(
        anchor.x,
        anchor.y - TEXT_ASCENT,
        anchor.x + text_width(text),
        anchor.y + TEXT_DESCENT,
    )
}

pub fn text_contains(point: Point, anchor: Point, text: &str) -> bool {
    let r = text_bounds(anchor, text);
    point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
}
