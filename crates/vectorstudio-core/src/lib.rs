//! Vector Studio Core Library
//!
//! Platform-agnostic scene model, geometry and interaction logic for the
//! Vector Studio diagram editor.

pub mod config;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod input;
pub mod scene;
pub mod shapes;
pub mod snap;
pub mod status;
pub mod tools;

pub use config::{ConfigSource, FormValues, Settings};
pub use editor::Editor;
pub use export::{ExportError, ExportFormat, ExportSink, MemorySink};
pub use input::{MouseButton, PointerEvent};
pub use scene::Scene;
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeKind, ShapeStyle, StyleEdit};
pub use snap::{GRID_SIZE, snap_to_grid, snap_value};
pub use status::StatusLine;
pub use tools::{GestureState, TextPrompt, ToolKind, ToolManager};
