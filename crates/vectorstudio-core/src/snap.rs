//! Grid snapping.

use kurbo::Point;

/// Grid size used when no valid size is configured (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Snap a coordinate to the nearest multiple of `grid_size`, halves rounding up.
///
/// Non-positive or non-finite grid sizes fall back to [`GRID_SIZE`].
pub fn snap_value(value: f64, grid_size: f64) -> f64 {
    let grid = if grid_size.is_finite() && grid_size > 0.0 {
        grid_size
    } else {
        GRID_SIZE
    };
    (value / grid + 0.5).floor() * grid
}

/// Snap both coordinates of a point to the grid.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}
