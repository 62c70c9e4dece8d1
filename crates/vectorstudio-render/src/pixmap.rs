//! CPU rasterizer for hosts without a canvas.
//!
//! Paths are flattened with kurbo and filled scanline by scanline with the
//! nonzero rule, one sample per pixel centre. Strokes go through
//! [`kurbo::stroke`] and are filled the same way. Text is not rasterized.

use crate::raster::{FrameReadback, PixelBuffer};
use crate::renderer::{FontSpec, RenderContext, Renderer, RendererError, Surface, render_frame};
use kurbo::{BezPath, Cap, Join, PathEl, Point, Rect, Shape as _, Size, Stroke, StrokeOpts};
use peniko::Color;
use vectorstudio_core::export::ExportError;

/// Flattening tolerance in pixels.
const TOLERANCE: f64 = 0.1;
/// Largest accepted side, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// An RGBA pixel grid that frames are drawn into and read back from.
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Create a transparent pixmap.
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RendererError::Surface(format!(
                "invalid pixmap size {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        })
    }

    /// Pixmap covering a canvas of `size`, rounded to whole pixels.
    pub fn for_canvas(size: Size) -> Result<Self, RendererError> {
        Self::new(size.width.round() as u32, size.height.round() as u32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        self.data[i..i + 4].try_into().ok()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend of one pixel.
    fn blend(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let i = self.index(x, y);
        let dst = &mut self.data[i..i + 4];
        let alpha = u32::from(color[3]);
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        for c in 0..3 {
            let mixed = u32::from(color[c]) * alpha + u32::from(dst[c]) * (255 - alpha);
            dst[c] = ((mixed + 127) / 255) as u8;
        }
        dst[3] = (alpha + u32::from(dst[3]) * (255 - alpha) / 255) as u8;
    }

    /// Paint the pixels of `row` whose centres fall in `[x0, x1)`.
    fn fill_span(&mut self, row: u32, x0: f64, x1: f64, color: [u8; 4]) {
        let first = (x0 - 0.5).ceil().max(0.0) as u32;
        let end = ((x1 - 0.5).ceil().max(0.0) as u32).min(self.width);
        for x in first..end {
            self.blend(x, row, color);
        }
    }

    fn fill_nonzero(&mut self, path: impl IntoIterator<Item = PathEl>, color: Color) {
        let edges = edges(path);
        if edges.is_empty() {
            return;
        }
        let color = rgba(color);
        let (min_y, max_y) = edges
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
                (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
            });
        let first_row = (min_y - 0.5).ceil().max(0.0) as u32;
        let end_row = ((max_y - 0.5).ceil().max(0.0) as u32).min(self.height);

        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for row in first_row..end_row {
            let y = f64::from(row) + 0.5;
            crossings.clear();
            for (a, b) in &edges {
                if (a.y <= y) != (b.y <= y) {
                    let t = (y - a.y) / (b.y - a.y);
                    let winding = if b.y > a.y { 1 } else { -1 };
                    crossings.push((a.x + t * (b.x - a.x), winding));
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding != 0 {
                    self.fill_span(row, pair[0].0, pair[1].0, color);
                }
            }
        }
    }
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Flatten `path` into non-horizontal line segments, closing every subpath.
fn edges(path: impl IntoIterator<Item = PathEl>) -> Vec<(Point, Point)> {
    let mut flat = Vec::new();
    kurbo::flatten(path, TOLERANCE, |el| flat.push(el));

    let mut edges = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    for el in flat {
        match el {
            PathEl::MoveTo(p) => {
                edges.push((last, start));
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                edges.push((last, p));
                last = p;
            }
            PathEl::ClosePath => {
                edges.push((last, start));
                last = start;
            }
            _ => {}
        }
    }
    edges.push((last, start));
    edges.retain(|(a, b)| a.y != b.y);
    edges
}

impl Surface for Pixmap {
    fn clear(&mut self, color: Color, size: Size) {
        self.fill_rect(Rect::from_origin_size(Point::ZERO, size), color);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.fill_nonzero(path.iter(), color);
    }

    // Butt caps and miter joins, like a 2D canvas context
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, dash: &[f64]) {
        if !(width.is_finite() && width > 0.0) {
            return;
        }
        let style = Stroke::new(width)
            .with_caps(Cap::Butt)
            .with_join(Join::Miter)
            .with_dashes(0.0, dash.iter().copied());
        let outline = kurbo::stroke(path.iter(), &style, &StrokeOpts::default(), TOLERANCE);
        self.fill_nonzero(outline.iter(), color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_nonzero(rect.path_elements(TOLERANCE), color);
    }

    fn fill_text(&mut self, text: &str, origin: Point, _font: &FontSpec, _color: Color) {
        log::debug!("Skipping text {text:?} at {origin:?}: no glyph rasterizer");
    }
}

impl Renderer for Pixmap {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.data.fill(0);
        render_frame(self, ctx);
    }
}

impl FrameReadback for Pixmap {
    fn read_pixels(&self) -> Result<PixelBuffer, ExportError> {
        Ok(PixelBuffer::new(self.data.clone(), self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::export_png;
    use std::io::Cursor;
    use vectorstudio_core::config::Settings;
    use vectorstudio_core::editor::Editor;
    use vectorstudio_core::export::MemorySink;
    use vectorstudio_core::shapes::{Line, Rectangle, Shape};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn red() -> Color {
        Color::from_rgba8(255, 0, 0, 255)
    }

    fn segment(a: Point, b: Point) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(a);
        path.line_to(b);
        path
    }

    #[test]
    fn test_new_rejects_empty_size() {
        assert!(matches!(Pixmap::new(0, 10), Err(RendererError::Surface(_))));
        assert!(Pixmap::new(MAX_DIMENSION + 1, 1).is_err());
        assert!(Pixmap::for_canvas(Size::new(-5.0, 10.0)).is_err());

        let pixmap = Pixmap::for_canvas(Size::new(3.4, 2.6)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (3, 3));
        assert_eq!(pixmap.pixel(0, 0), Some(CLEAR));
        assert_eq!(pixmap.pixel(3, 0), None);
    }

    #[test]
    fn test_fill_rect_covers_pixel_centers() {
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        pixmap.fill_rect(Rect::new(2.0, 2.0, 5.0, 5.0), red());
        assert_eq!(pixmap.pixel(2, 2), Some(RED));
        assert_eq!(pixmap.pixel(4, 4), Some(RED));
        assert_eq!(pixmap.pixel(5, 5), Some(CLEAR));
        assert_eq!(pixmap.pixel(1, 3), Some(CLEAR));
    }

    #[test]
    fn test_fill_path_closes_open_subpath() {
        let mut pixmap = Pixmap::new(10, 10).unwrap();
        let mut triangle = BezPath::new();
        triangle.move_to(Point::new(0.0, 0.0));
        triangle.line_to(Point::new(10.0, 0.0));
        triangle.line_to(Point::new(0.0, 10.0));
        pixmap.fill_path(&triangle, red());
        assert_eq!(pixmap.pixel(1, 1), Some(RED));
        assert_eq!(pixmap.pixel(8, 8), Some(CLEAR));
    }

    #[test]
    fn test_fill_clips_to_bounds() {
        let mut pixmap = Pixmap::new(4, 4).unwrap();
        pixmap.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), red());
        assert_eq!(pixmap.pixel(0, 0), Some(RED));
        assert_eq!(pixmap.pixel(3, 3), Some(RED));
    }

    #[test]
    fn test_stroke_has_butt_caps() {
        let mut pixmap = Pixmap::new(20, 10).unwrap();
        pixmap.stroke_path(&segment(Point::new(4.0, 5.0), Point::new(14.0, 5.0)), red(), 2.0, &[]);
        assert_eq!(pixmap.pixel(4, 4), Some(RED));
        assert_eq!(pixmap.pixel(13, 5), Some(RED));
        assert_eq!(pixmap.pixel(9, 3), Some(CLEAR));
        assert_eq!(pixmap.pixel(9, 6), Some(CLEAR));
        assert_eq!(pixmap.pixel(3, 5), Some(CLEAR));
        assert_eq!(pixmap.pixel(14, 5), Some(CLEAR));
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let mut pixmap = Pixmap::new(20, 10).unwrap();
        pixmap.stroke_path(&segment(Point::new(0.0, 5.0), Point::new(20.0, 5.0)), red(), 2.0, &[5.0, 5.0]);
        assert_eq!(pixmap.pixel(2, 5), Some(RED));
        assert_eq!(pixmap.pixel(7, 5), Some(CLEAR));
        assert_eq!(pixmap.pixel(12, 5), Some(RED));
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        pixmap.clear(Color::from_rgba8(0, 0, 0, 255), Size::new(2.0, 2.0));
        pixmap.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::from_rgba8(255, 255, 255, 128));
        assert_eq!(pixmap.pixel(1, 1), Some([128, 128, 128, 255]));
    }

    #[test]
    fn test_frame_paints_shapes_over_background() {
        let mut editor = Editor::new(Settings::default()).with_canvas_size(Size::new(100.0, 100.0));
        editor
            .scene
            .add_shape(Shape::Rect(Rectangle::new(Point::new(10.0, 10.0), 40.0, 40.0)));
        editor
            .scene
            .add_shape(Shape::Line(Line::new(Point::new(70.0, 90.0), Point::new(95.0, 90.0))));

        let mut pixmap = Pixmap::for_canvas(editor.canvas_size()).unwrap();
        pixmap.build_scene(&RenderContext::for_editor(&editor));

        // Rect interior takes the fill color
        assert_eq!(pixmap.pixel(30, 30), Some([0x33, 0x33, 0x33, 0xff]));
        // Off-grid background
        assert_eq!(pixmap.pixel(70, 70), Some([0x11, 0x11, 0x11, 0xff]));
        // Grid line at x = 60 lands in the column on one side of it
        let grid = Some([0x22, 0x22, 0x22, 0xff]);
        assert!(pixmap.pixel(59, 70) == grid || pixmap.pixel(60, 70) == grid);
        // Lines are stroked in the default stroke color, never filled
        assert_eq!(pixmap.pixel(80, 90), Some([0xff, 0xff, 0xff, 0xff]));
        assert_eq!(pixmap.pixel(75, 85), Some([0x11, 0x11, 0x11, 0xff]));
    }

    #[test]
    fn test_frame_exports_as_png() {
        let mut editor = Editor::new(Settings::default()).with_canvas_size(Size::new(64.0, 48.0));
        let mut pixmap = Pixmap::for_canvas(editor.canvas_size()).unwrap();
        pixmap.build_scene(&RenderContext::for_editor(&editor));

        let mut sink = MemorySink::new();
        export_png(&mut editor, &pixmap, &mut sink).unwrap();

        let file = sink.last().unwrap();
        assert_eq!(file.filename, "vector_diagram.png");
        let decoder = png::Decoder::new(Cursor::new(file.data.clone()));
        let mut reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 64);
        assert_eq!(reader.info().height, 48);
        let mut buf = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut buf).unwrap();
        assert_eq!(&buf[..4], &[0x11, 0x11, 0x11, 0xff]);
    }
}
