//! Display list backend: records drawing commands instead of rasterizing.
//!
//! Hosts without a 2D context (the headless runner, tests) render into a
//! [`DisplayList`] and replay or inspect the commands.

use crate::renderer::{FontSpec, RenderContext, Renderer, Surface, render_frame};
use kurbo::{BezPath, Point, Rect, Size};
use peniko::Color;

/// A single recorded drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear {
        color: Color,
        size: Size,
    },
    FillPath {
        path: BezPath,
        color: Color,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f64,
        dash: Vec<f64>,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillText {
        text: String,
        origin: Point,
        font: FontSpec,
        color: Color,
    },
}

/// Ordered drawing commands of the last built frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all recorded commands.
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl Surface for DisplayList {
    fn clear(&mut self, color: Color, size: Size) {
        self.commands.push(DrawCommand::Clear { color, size });
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, dash: &[f64]) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            color,
            width,
            dash: dash.to_vec(),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            origin,
            font: font.clone(),
            color,
        });
    }
}

impl Renderer for DisplayList {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.reset();
        render_frame(self, ctx);
    }
}
