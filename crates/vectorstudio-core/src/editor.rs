//! The editor: scene, tools, configuration and status bundled into one
//! context object that the host drives with pointer events and commands.

use crate::config::ConfigSource;
use crate::export::{ExportError, ExportFormat, ExportSink, to_svg};
use crate::input::{MouseButton, PointerEvent};
use crate::scene::Scene;
use crate::shapes::{Shape, ShapeId, ShapeStyle, StyleEdit};
use crate::status::StatusLine;
use crate::tools::{NoPrompt, TextPrompt, ToolKind, ToolManager};
use kurbo::{Point, Size};

/// Canvas size before the host reports one.
pub const DEFAULT_CANVAS_SIZE: Size = Size::new(800.0, 600.0);

/// Editor state for one drawing surface.
pub struct Editor<C: ConfigSource> {
    /// The shapes.
    pub scene: Scene,
    /// Active tool and gesture.
    pub tools: ToolManager,
    config: C,
    prompt: Box<dyn TextPrompt>,
    status: StatusLine,
    cursor: Point,
    canvas_size: Size,
}

impl<C: ConfigSource> Editor<C> {
    /// Create an editor reading its settings from `config`.
    pub fn new(config: C) -> Self {
        Self {
            scene: Scene::new(),
            tools: ToolManager::new(),
            config,
            prompt: Box::new(NoPrompt),
            status: StatusLine::new(),
            cursor: Point::ZERO,
            canvas_size: DEFAULT_CANVAS_SIZE,
        }
    }

    /// Use `prompt` to ask for the content of new text shapes.
    pub fn with_prompt(mut self, prompt: impl TextPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn with_canvas_size(mut self, size: Size) -> Self {
        self.canvas_size = size;
        self
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    pub fn grid_size(&self) -> f64 {
        self.config.grid_size()
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Switch tools, clearing the selection and dropping any gesture.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.abandon(&mut self.scene);
        self.tools.set_tool(tool);
        self.scene.set_selection(None);
        log::debug!("Tool: {tool}");
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.cursor = point;
        self.tools
            .pointer_down(&mut self.scene, &self.config, self.prompt.as_mut(), point);
    }

    pub fn pointer_move(&mut self, point: Point) {
        self.cursor = point;
        self.tools.pointer_move(&mut self.scene, &self.config, point);
    }

    /// Finish the current gesture. Returns the id of a newly committed shape.
    pub fn pointer_up(&mut self, point: Point) -> Option<ShapeId> {
        self.cursor = point;
        self.tools.pointer_up(&mut self.scene)
    }

    /// Dispatch a pointer event. Only the primary button starts gestures.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Option<ShapeId> {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                self.pointer_down(position);
                None
            }
            PointerEvent::Move { position } => {
                self.pointer_move(position);
                None
            }
            PointerEvent::Up { position, .. } => self.pointer_up(position),
            other => {
                self.cursor = other.position();
                None
            }
        }
    }

    /// Apply a property edit to the selected shape.
    pub fn apply_style(&mut self, edit: &StyleEdit) -> bool {
        self.scene.mutate_selected(edit)
    }

    /// Style of the selected shape, for reflecting in a property panel.
    pub fn selection_style(&self) -> Option<&ShapeStyle> {
        self.scene.selected_style()
    }

    /// Delete the selected shape. Does nothing without a selection.
    pub fn delete_selected(&mut self) -> Option<Shape> {
        let removed = self.scene.remove_selected()?;
        self.tools.forget_shape(removed.id());
        Some(removed)
    }

    /// Remove every shape. Hosts confirm with the user before calling this.
    pub fn clear_all(&mut self) {
        self.tools.abandon(&mut self.scene);
        self.scene.clear_all();
        log::debug!("Cleared canvas");
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Record a new canvas size. Shapes keep their coordinates.
    pub fn resize(&mut self, size: Size) {
        self.canvas_size = size;
    }

    /// Last pointer position.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Cursor position rounded for a coordinates display, e.g. `"120, 45"`.
    pub fn cursor_readout(&self) -> String {
        format!("{}, {}", self.cursor.x.round(), self.cursor.y.round())
    }

    /// Export the committed shapes as SVG into `sink`.
    pub fn export_svg(&mut self, sink: &mut dyn ExportSink) -> Result<(), ExportError> {
        let svg = to_svg(self.scene.shapes(), self.canvas_size)
            .inspect_err(|e| log::error!("SVG export failed: {e}"))?;
        self.deliver(ExportFormat::Svg, svg.as_bytes(), sink)
    }

    /// Hand exported bytes to `sink` and announce success on the status line.
    pub fn deliver(
        &mut self,
        format: ExportFormat,
        data: &[u8],
        sink: &mut dyn ExportSink,
    ) -> Result<(), ExportError> {
        let filename = format.filename();
        sink.save(&filename, format.mime_type(), data)
            .inspect_err(|e| log::error!("Export failed: {e}"))?;
        log::info!("Exported {filename} ({} bytes)", data.len());
        self.status.show(format.status_message());
        Ok(())
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Current status text, if it has not faded.
    pub fn status_message(&self) -> Option<&str> {
        self.status.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::export::MemorySink;
    use crate::shapes::{Rectangle, SerializableColor};

    fn editor() -> Editor<Settings> {
        Editor::new(Settings::default())
    }

    fn draw(editor: &mut Editor<Settings>, tool: ToolKind, from: Point, to: Point) -> Option<ShapeId> {
        editor.set_tool(tool);
        editor.pointer_down(from);
        editor.pointer_move(to);
        editor.pointer_up(to)
    }

    struct FailingSink;

    impl ExportSink for FailingSink {
        fn save(&mut self, filename: &str, _mime_type: &str, _data: &[u8]) -> Result<(), ExportError> {
            Err(ExportError::Sink {
                filename: filename.to_string(),
                reason: "disk full".to_string(),
            })
        }
    }

    #[test]
    fn test_draw_uses_live_config() {
        let mut editor = editor();
        editor.config_mut().fill_color = SerializableColor::rgb(0, 255, 0);
        editor.config_mut().grid_size = 50.0;
        let id = draw(&mut editor, ToolKind::Rect, Point::new(10.0, 10.0), Point::new(90.0, 60.0)).unwrap();
        let shape = editor.scene.get(id).unwrap();
        assert_eq!(shape.style().fill_color.to_hex(), "#00ff00");
        let frame = shape.frame().unwrap();
        assert_eq!(frame.origin, Point::new(0.0, 0.0));
        assert!((frame.width - 100.0).abs() < f64::EPSILON);
        assert!((frame.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_change_mid_draw() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rect);
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(33.0, 33.0));
        let draft = editor.scene.draft().unwrap();
        assert!((draft.frame().unwrap().width - 40.0).abs() < f64::EPSILON);

        editor.config_mut().grid_size = 50.0;
        editor.config_mut().fill_color = SerializableColor::rgb(1, 2, 3);
        editor.pointer_move(Point::new(33.0, 33.0));

        // The draft re-snaps to the new grid but keeps the style it started with
        let draft = editor.scene.draft().unwrap();
        let frame = draft.frame().unwrap();
        assert!((frame.width - 50.0).abs() < f64::EPSILON);
        assert!((frame.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(draft.style().fill_color.to_hex(), "#333333");

        let id = editor.pointer_up(Point::new(33.0, 33.0)).unwrap();
        assert_eq!(editor.scene.get(id).unwrap().style().fill_color.to_hex(), "#333333");
    }

    #[test]
    fn test_text_placement_restores_select_cursor() {
        let mut editor = editor().with_prompt(|_: &str, _: &str| Some("Label".to_string()));
        editor.set_tool(ToolKind::Text);
        assert_eq!(editor.tool().cursor(), "crosshair");
        editor.handle_pointer_event(PointerEvent::Down {
            position: Point::new(40.0, 40.0),
            button: MouseButton::Left,
        });
        assert_eq!(editor.scene.len(), 1);
        assert_eq!(editor.tool(), ToolKind::Select);
        assert_eq!(editor.tool().cursor(), "default");
    }

    #[test]
    fn test_set_tool_clears_selection() {
        let mut editor = editor();
        let id = editor
            .scene
            .add_shape(Shape::Rect(Rectangle::new(Point::ZERO, 40.0, 40.0)))
            .unwrap();
        editor.pointer_down(Point::new(10.0, 10.0));
        editor.pointer_up(Point::new(10.0, 10.0));
        assert_eq!(editor.scene.selection(), Some(id));
        editor.set_tool(ToolKind::Circle);
        assert_eq!(editor.scene.selection(), None);
    }

    #[test]
    fn test_set_tool_mid_draw_discards_draft() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rect);
        editor.pointer_down(Point::new(0.0, 0.0));
        editor.pointer_move(Point::new(100.0, 100.0));
        editor.set_tool(ToolKind::Select);
        assert!(editor.scene.draft().is_none());
        assert!(editor.pointer_up(Point::new(100.0, 100.0)).is_none());
        assert!(editor.scene.is_empty());
    }

    #[test]
    fn test_style_edit_reaches_selection_only() {
        let mut editor = editor();
        let red = SerializableColor::rgb(255, 0, 0);
        assert!(!editor.apply_style(&StyleEdit::stroke(red)));

        let id = draw(&mut editor, ToolKind::Rect, Point::ZERO, Point::new(40.0, 40.0)).unwrap();
        editor.set_tool(ToolKind::Select);
        editor.pointer_down(Point::new(20.0, 20.0));
        editor.pointer_up(Point::new(20.0, 20.0));
        assert!(editor.apply_style(&StyleEdit::stroke(red)));
        assert_eq!(editor.selection_style().map(|s| s.stroke_color), Some(red));
        assert_eq!(editor.scene.get(id).unwrap().style().stroke_color, red);
    }

    #[test]
    fn test_delete_selected_during_drag() {
        let mut editor = editor();
        editor
            .scene
            .add_shape(Shape::Rect(Rectangle::new(Point::ZERO, 40.0, 40.0)));
        editor.pointer_down(Point::new(10.0, 10.0));
        assert!(editor.delete_selected().is_some());
        editor.pointer_move(Point::new(100.0, 100.0));
        assert!(editor.scene.is_empty());
        assert!(!editor.tools.is_active());
        assert!(editor.delete_selected().is_none());
    }

    #[test]
    fn test_handle_pointer_event_ignores_secondary_button() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rect);
        editor.handle_pointer_event(PointerEvent::Down {
            position: Point::new(12.0, 7.0),
            button: MouseButton::Right,
        });
        assert!(editor.scene.draft().is_none());
        assert_eq!(editor.cursor(), Point::new(12.0, 7.0));

        editor.handle_pointer_event(PointerEvent::Down {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        });
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(40.0, 40.0),
        });
        let id = editor.handle_pointer_event(PointerEvent::Up {
            position: Point::new(40.0, 40.0),
            button: MouseButton::Left,
        });
        assert!(id.is_some());
    }

    #[test]
    fn test_cursor_readout() {
        let mut editor = editor();
        editor.pointer_move(Point::new(120.4, 44.6));
        assert_eq!(editor.cursor_readout(), "120, 45");
    }

    #[test]
    fn test_export_svg_sets_status() {
        let mut editor = editor();
        draw(&mut editor, ToolKind::Oval, Point::ZERO, Point::new(60.0, 40.0));
        let mut sink = MemorySink::new();
        editor.export_svg(&mut sink).unwrap();
        let file = sink.last().unwrap();
        assert_eq!(file.filename, "vector_diagram.svg");
        assert_eq!(file.mime_type, "image/svg+xml");
        assert!(String::from_utf8(file.data.clone()).unwrap().contains("<ellipse"));
        assert_eq!(editor.status_message(), Some("EXPORTED SVG"));
    }

    #[test]
    fn test_failed_export_leaves_status() {
        let mut editor = editor();
        assert!(editor.export_svg(&mut FailingSink).is_err());
        assert_eq!(editor.status_message(), None);
    }

    #[test]
    fn test_resize_keeps_shapes() {
        let mut editor = editor();
        let id = draw(&mut editor, ToolKind::Rect, Point::ZERO, Point::new(40.0, 40.0)).unwrap();
        editor.resize(Size::new(1024.0, 768.0));
        assert_eq!(editor.canvas_size(), Size::new(1024.0, 768.0));
        assert_eq!(editor.scene.get(id).unwrap().origin(), Point::ZERO);
    }
}
