//! Vector Studio Render Library
//!
//! Frame composition over an abstract drawing surface, a display list
//! backend, a CPU rasterizer, the cancellable redraw loop and raster export.

mod display_list;
mod pixmap;
mod raster;
mod redraw;
mod renderer;

pub use display_list::{DisplayList, DrawCommand};
pub use pixmap::{MAX_DIMENSION, Pixmap};
pub use raster::{FrameReadback, PixelBuffer, encode_png, export, export_png};
pub use redraw::{CancelHandle, RedrawTask};
pub use renderer::{
    FontSpec, RenderContext, Renderer, RendererError, ShapeRenderer, Surface, render_frame,
    selection_outline,
};
