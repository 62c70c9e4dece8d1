//! Renderer trait abstraction and frame composition.

use kurbo::{BezPath, Point, Rect, Shape as _, Size};
use peniko::Color;
use thiserror::Error;
use vectorstudio_core::config::ConfigSource;
use vectorstudio_core::editor::Editor;
use vectorstudio_core::scene::Scene;
use vectorstudio_core::shapes::{FONT_FAMILY, FONT_SIZE, Shape};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Gap between a shape and its dashed selection outline.
pub const SELECTION_PADDING: f64 = 5.0;
/// Side of the square endpoint handles on a selected line.
pub const HANDLE_SIZE: f64 = 6.0;
/// Dash pattern of the selection outline.
pub const SELECTION_DASH: [f64; 2] = [5.0, 5.0];

/// Font used to draw a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: &'static str,
    pub size: f64,
    pub bold: bool,
}

impl FontSpec {
    /// The font of every text label.
    pub fn label() -> Self {
        Self {
            family: FONT_FAMILY,
            size: FONT_SIZE,
            bold: true,
        }
    }

    /// CSS font shorthand, e.g. `bold 16px Courier New`.
    pub fn css(&self) -> String {
        let weight = if self.bold { "bold " } else { "" };
        format!("{weight}{}px {}", self.size, self.family)
    }
}

/// Immediate-mode 2D drawing target.
pub trait Surface {
    /// Fill the whole surface with `color`.
    fn clear(&mut self, color: Color, size: Size);

    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Stroke `path`. An empty `dash` draws a solid line.
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, dash: &[f64]);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw `text` with its baseline starting at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color);
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The shapes to render.
    pub scene: &'a Scene,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    /// Grid spacing.
    pub grid_size: f64,
    /// Background color.
    pub background_color: Color,
    /// Grid line color.
    pub grid_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: &'a Scene, viewport_size: Size, grid_size: f64) -> Self {
        Self {
            scene,
            viewport_size,
            grid_size,
            background_color: Color::from_rgba8(0x11, 0x11, 0x11, 255),
            grid_color: Color::from_rgba8(0x22, 0x22, 0x22, 255),
            selection_color: Color::from_rgba8(0x00, 0xff, 0x00, 255),
        }
    }

    /// Context for the editor's current scene, canvas size and grid.
    pub fn for_editor<C: ConfigSource>(editor: &'a Editor<C>) -> Self {
        Self::new(&editor.scene, editor.canvas_size(), editor.grid_size())
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the drawing commands for a frame.
    ///
    /// Called once per frame; each call replaces the previous frame.
    fn build_scene(&mut self, ctx: &RenderContext);
}

/// Dashed outline drawn around a selected shape. Lines and arrows have
/// none; they are highlighted along the segment instead.
pub fn selection_outline(shape: &Shape) -> Option<Rect> {
    match shape {
        Shape::Rect(_) | Shape::Oval(_) | Shape::Diamond(_) | Shape::Parallelogram(_) => shape
            .frame()
            .map(|frame| frame.normalized().inflate(SELECTION_PADDING, SELECTION_PADDING)),
        Shape::Circle(_) => Some(shape.bounds().inflate(SELECTION_PADDING, SELECTION_PADDING)),
        Shape::Text(text) => Some(Rect::new(
            text.anchor.x - SELECTION_PADDING,
            text.anchor.y - 20.0,
            text.anchor.x + text.width() + SELECTION_PADDING,
            text.anchor.y + 10.0,
        )),
        Shape::Line(_) | Shape::Arrow(_) => None,
    }
}

fn segment(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

fn handle(center: Point) -> Rect {
    Rect::from_center_size(center, Size::new(HANDLE_SIZE, HANDLE_SIZE))
}

/// Helper trait for shape rendering, implemented for every surface.
pub trait ShapeRenderer {
    /// Render a shape with its own style.
    fn render_shape(&mut self, shape: &Shape);

    /// Render grid lines across the viewport.
    fn render_grid(&mut self, viewport: Size, grid_size: f64, color: Color);

    /// Render the selection decoration for a shape.
    fn render_selection(&mut self, shape: &Shape, color: Color);
}

impl<S: Surface + ?Sized> ShapeRenderer for S {
    fn render_shape(&mut self, shape: &Shape) {
        let style = shape.style();
        if let Shape::Text(text) = shape {
            self.fill_text(&text.content, text.anchor, &FontSpec::label(), style.stroke());
            return;
        }
        let path = shape.to_path();
        if shape.kind().is_closed() {
            self.fill_path(&path, style.fill());
        }
        self.stroke_path(&path, style.stroke(), style.stroke_width, &[]);
    }

    fn render_grid(&mut self, viewport: Size, grid_size: f64, color: Color) {
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return;
        }
        let mut path = BezPath::new();

        // Vertical lines
        let mut x = 0.0;
        while x < viewport.width {
            path.move_to(Point::new(x, 0.0));
            path.line_to(Point::new(x, viewport.height));
            x += grid_size;
        }

        // Horizontal lines
        let mut y = 0.0;
        while y < viewport.height {
            path.move_to(Point::new(0.0, y));
            path.line_to(Point::new(viewport.width, y));
            y += grid_size;
        }

        self.stroke_path(&path, color, 1.0, &[]);
    }

    fn render_selection(&mut self, shape: &Shape, color: Color) {
        if let Some(rect) = selection_outline(shape) {
            self.stroke_path(&rect.to_path(0.1), color, 1.0, &SELECTION_DASH);
            return;
        }
        if let Some(end) = shape.end_point() {
            let start = shape.origin();
            self.stroke_path(&segment(start, end), color, 1.0, &SELECTION_DASH);
            self.fill_rect(handle(start), color);
            self.fill_rect(handle(end), color);
        }
    }
}

/// Draw one complete frame: background, grid, committed shapes in order,
/// the draft, then the selection decoration.
pub fn render_frame<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext) {
    surface.clear(ctx.background_color, ctx.viewport_size);
    surface.render_grid(ctx.viewport_size, ctx.grid_size, ctx.grid_color);

    for shape in ctx.scene.shapes() {
        surface.render_shape(shape);
    }

    if let Some(draft) = ctx.scene.draft() {
        surface.render_shape(draft);
    }

    if let Some(selected) = ctx.scene.selected() {
        surface.render_selection(selected, ctx.selection_color);
    }
}
