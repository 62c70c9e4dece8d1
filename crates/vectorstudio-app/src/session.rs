//! Headless sessions: replay a scripted sequence of editor actions and write
//! the exports to a directory.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vectorstudio_core::editor::DEFAULT_CANVAS_SIZE;
use vectorstudio_core::{
    Editor, ExportError, ExportFormat, ExportSink, Settings, StyleEdit, TextPrompt, ToolKind,
};
use vectorstudio_render::{Pixmap, RenderContext, Renderer, RendererError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Render failed: {0}")]
    Render(#[from] RendererError),

    #[error("{0}")]
    Usage(String),
}

/// One scripted editor action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    Tool { tool: ToolKind },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// Edit the selected shape.
    Style(StyleEdit),
    /// Replace the live settings.
    Config(Settings),
    Grid { size: f64 },
    Delete,
    Clear,
    Resize { width: f64, height: f64 },
    Export { format: ExportFormat },
}

fn default_canvas() -> Size {
    DEFAULT_CANVAS_SIZE
}

/// A recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default = "default_canvas")]
    pub canvas: Size,
    /// Answers to text prompts, consumed in order.
    #[serde(default)]
    pub prompts: Vec<String>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Text prompt answered from a fixed queue. An exhausted queue cancels.
#[derive(Debug, Clone, Default)]
pub struct QueuedPrompt {
    answers: VecDeque<String>,
}

impl QueuedPrompt {
    pub fn new(answers: impl IntoIterator<Item = String>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }
}

impl TextPrompt for QueuedPrompt {
    fn prompt(&mut self, message: &str, _default: &str) -> Option<String> {
        let answer = self.answers.pop_front();
        if answer.is_none() {
            log::debug!("No scripted answer for {message:?}, cancelling");
        }
        answer
    }
}

/// Sink writing each export into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ExportSink for FileSink {
    fn save(&mut self, filename: &str, _mime_type: &str, data: &[u8]) -> Result<(), ExportError> {
        let sink_error = |e: std::io::Error| ExportError::Sink {
            filename: filename.to_string(),
            reason: e.to_string(),
        };
        std::fs::create_dir_all(&self.dir).map_err(sink_error)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, data).map_err(sink_error)?;
        self.written.push(path);
        Ok(())
    }
}

/// Outcome of a replayed script.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub shapes: usize,
    pub exported: Vec<PathBuf>,
}

/// Replays scripts against an editor.
pub struct Session {
    editor: Editor<Settings>,
    sink: FileSink,
}

impl Session {
    pub fn new(script: &Script, out_dir: impl Into<PathBuf>) -> Self {
        let editor = Editor::new(script.settings.clone())
            .with_prompt(QueuedPrompt::new(script.prompts.iter().cloned()))
            .with_canvas_size(script.canvas);
        Self {
            editor,
            sink: FileSink::new(out_dir),
        }
    }

    pub fn editor(&self) -> &Editor<Settings> {
        &self.editor
    }

    /// Apply one step.
    pub fn apply(&mut self, step: &Step) -> Result<(), AppError> {
        match step {
            Step::Tool { tool } => self.editor.set_tool(*tool),
            Step::Down { x, y } => self.editor.pointer_down(Point::new(*x, *y)),
            Step::Move { x, y } => self.editor.pointer_move(Point::new(*x, *y)),
            Step::Up { x, y } => {
                if let Some(id) = self.editor.pointer_up(Point::new(*x, *y)) {
                    log::debug!("Committed {id}");
                }
            }
            Step::Style(edit) => {
                if !self.editor.apply_style(edit) {
                    log::debug!("Style edit without a selection ignored");
                }
            }
            Step::Config(settings) => *self.editor.config_mut() = settings.clone(),
            Step::Grid { size } => self.editor.config_mut().grid_size = *size,
            Step::Delete => {
                self.editor.delete_selected();
            }
            Step::Clear => self.editor.clear_all(),
            Step::Resize { width, height } => self.editor.resize(Size::new(*width, *height)),
            Step::Export { format } => match format {
                ExportFormat::Svg => self.editor.export_svg(&mut self.sink)?,
                ExportFormat::Png => {
                    let mut frame = Pixmap::for_canvas(self.editor.canvas_size())?;
                    frame.build_scene(&RenderContext::for_editor(&self.editor));
                    vectorstudio_render::export_png(&mut self.editor, &frame, &mut self.sink)?;
                }
            },
        }
        Ok(())
    }

    /// Apply every step in order, stopping at the first failure.
    pub fn run(mut self, steps: &[Step]) -> Result<SessionReport, AppError> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(SessionReport {
            shapes: self.editor.scene.len(),
            exported: self.sink.written().to_vec(),
        })
    }
}

/// Load `script_path` and replay it, writing exports into `out_dir`.
pub fn run_script(script_path: &Path, out_dir: &Path) -> Result<SessionReport, AppError> {
    let script = Script::load(script_path)?;
    log::info!(
        "Replaying {} steps from {}",
        script.steps.len(),
        script_path.display()
    );
    Session::new(&script, out_dir).run(&script.steps)
}

/// Parse command line arguments: `<script.json> [out_dir]`.
pub fn parse_args(args: &[String]) -> Result<(PathBuf, PathBuf), AppError> {
    match args {
        [script] => Ok((PathBuf::from(script), PathBuf::from("."))),
        [script, out_dir] => Ok((PathBuf::from(script), PathBuf::from(out_dir))),
        _ => Err(AppError::Usage(
            "usage: vectorstudio <script.json> [out_dir]".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectorstudio_core::SerializableColor;

    const FLOWCHART: &str = r##"{
        "settings": { "grid_size": 20, "fill_color": "#333333" },
        "canvas": { "width": 400, "height": 300 },
        "prompts": ["Start"],
        "steps": [
            { "op": "tool", "tool": "rect" },
            { "op": "down", "x": 22, "y": 18 },
            { "op": "move", "x": 141, "y": 79 },
            { "op": "up", "x": 141, "y": 79 },
            { "op": "tool", "tool": "text" },
            { "op": "down", "x": 40, "y": 40 },
            { "op": "up", "x": 40, "y": 40 },
            { "op": "down", "x": 60, "y": 60 },
            { "op": "up", "x": 60, "y": 60 },
            { "op": "export", "format": "svg" },
            { "op": "export", "format": "png" }
        ]
    }"##;

    #[test]
    fn test_parse_script() {
        let script = Script::from_json(FLOWCHART).unwrap();
        assert_eq!(script.canvas, Size::new(400.0, 300.0));
        assert_eq!(script.prompts, vec!["Start".to_string()]);
        assert_eq!(script.steps[0], Step::Tool { tool: ToolKind::Rect });
        assert_eq!(
            script.steps[9],
            Step::Export {
                format: ExportFormat::Svg
            }
        );
    }

    #[test]
    fn test_script_defaults() {
        let script = Script::from_json(r#"{ "steps": [] }"#).unwrap();
        assert_eq!(script.settings, Settings::default());
        assert_eq!(script.canvas, DEFAULT_CANVAS_SIZE);
        assert!(script.prompts.is_empty());
    }

    #[test]
    fn test_style_and_config_steps() {
        let steps: Vec<Step> = serde_json::from_str(
            r##"[
                { "op": "style", "stroke_color": "#ff0000" },
                { "op": "config", "grid_size": 10 },
                { "op": "grid", "size": 40 },
                { "op": "delete" }
            ]"##,
        )
        .unwrap();
        assert_eq!(
            steps[0],
            Step::Style(StyleEdit::stroke(SerializableColor::rgb(255, 0, 0)))
        );
        match &steps[1] {
            Step::Config(settings) => assert!((settings.grid_size - 10.0).abs() < f64::EPSILON),
            other => panic!("expected config, got {other:?}"),
        }
        assert_eq!(steps[3], Step::Delete);
    }

    #[test]
    fn test_invalid_script() {
        let result = Script::from_json(r#"{ "steps": [{ "op": "spin" }] }"#);
        assert!(matches!(result, Err(AppError::Script(_))));
    }

    #[test]
    fn test_queued_prompt() {
        let mut prompt = QueuedPrompt::new(["a".to_string()]);
        assert_eq!(prompt.prompt("Enter text:", "Label"), Some("a".to_string()));
        assert_eq!(prompt.prompt("Enter text:", "Label"), None);
    }

    #[test]
    fn test_run_flowchart() {
        let dir = tempfile::tempdir().unwrap();
        let script = Script::from_json(FLOWCHART).unwrap();
        let report = Session::new(&script, dir.path()).run(&script.steps).unwrap();

        // Placing the label hands back to Select, so the last click selects the rect
        assert_eq!(report.shapes, 2);
        assert_eq!(
            report.exported,
            vec![
                dir.path().join("vector_diagram.svg"),
                dir.path().join("vector_diagram.png"),
            ]
        );

        let svg = std::fs::read_to_string(dir.path().join("vector_diagram.svg")).unwrap();
        assert!(svg.contains("width=\"400\""));
        assert!(svg.contains(">Start</text>"));

        let png = std::fs::read(dir.path().join("vector_diagram.png")).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        // IHDR width and height, big-endian
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 400);
        assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 300);
    }

    #[test]
    fn test_png_export_of_empty_canvas_fails() {
        let dir = tempfile::tempdir().unwrap();
        let script = Script::from_json(
            r#"{ "steps": [
                { "op": "resize", "width": 0, "height": 300 },
                { "op": "export", "format": "png" }
            ] }"#,
        )
        .unwrap();
        let result = Session::new(&script, dir.path()).run(&script.steps);
        assert!(matches!(result, Err(AppError::Render(RendererError::Surface(_)))));
        assert!(!dir.path().join("vector_diagram.png").exists());
    }

    #[test]
    fn test_session_tracks_tool_after_text() {
        let script = Script::from_json(FLOWCHART).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(&script, dir.path());
        for step in &script.steps[..7] {
            session.apply(step).unwrap();
        }
        assert_eq!(session.editor().tool(), ToolKind::Select);
    }

    #[test]
    fn test_file_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("diagrams");
        let mut sink = FileSink::new(&nested);
        sink.save("a.svg", "image/svg+xml", b"<svg/>").unwrap();
        assert_eq!(std::fs::read(nested.join("a.svg")).unwrap(), b"<svg/>");
        assert_eq!(sink.written().len(), 1);
    }

    #[test]
    fn test_file_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let mut sink = FileSink::new(&blocker);
        let err = sink.save("a.svg", "image/svg+xml", b"<svg/>").unwrap_err();
        assert!(matches!(err, ExportError::Sink { ref filename, .. } if filename == "a.svg"));
    }

    #[test]
    fn test_run_script_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_script(&dir.path().join("missing.json"), dir.path());
        assert!(matches!(result, Err(AppError::Io { .. })));
    }

    #[test]
    fn test_parse_args() {
        let (script, out) = parse_args(&["s.json".to_string()]).unwrap();
        assert_eq!(script, PathBuf::from("s.json"));
        assert_eq!(out, PathBuf::from("."));
        assert!(matches!(parse_args(&[]), Err(AppError::Usage(_))));
    }
}
