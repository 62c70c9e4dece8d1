//! Tool system and the pointer gesture state machine.

use crate::config::ConfigSource;
use crate::scene::Scene;
use crate::shapes::{Shape, ShapeId, ShapeKind, Text};
use crate::snap::snap_to_grid;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prompt shown when the text tool is used.
pub const TEXT_PROMPT_MESSAGE: &str = "Enter text:";
/// Answer pre-filled in the text prompt.
pub const TEXT_PROMPT_DEFAULT: &str = "Label";
/// Distance within which a press grabs an endpoint of the selected line.
pub const HANDLE_HIT_TOLERANCE: f64 = 6.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Rect,
    Circle,
    Oval,
    Diamond,
    Parallelogram,
    Line,
    Arrow,
    Text,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Select,
        ToolKind::Rect,
        ToolKind::Circle,
        ToolKind::Oval,
        ToolKind::Diamond,
        ToolKind::Parallelogram,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Text,
    ];

    /// Kind of shape this tool creates.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Select => None,
            ToolKind::Rect => Some(ShapeKind::Rect),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Oval => Some(ShapeKind::Oval),
            ToolKind::Diamond => Some(ShapeKind::Diamond),
            ToolKind::Parallelogram => Some(ShapeKind::Parallelogram),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Arrow => Some(ShapeKind::Arrow),
            ToolKind::Text => Some(ShapeKind::Text),
        }
    }

    pub fn name(self) -> &'static str {
        self.shape_kind().map_or("select", ShapeKind::name)
    }

    /// CSS cursor shown over the canvas while this tool is active.
    pub fn cursor(self) -> &'static str {
        match self {
            ToolKind::Select => "default",
            _ => "crosshair",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown tool: {0:?}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// Which end of a line or arrow is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Positions captured when a drag begins; every move is computed from these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSnapshot {
    pub id: ShapeId,
    /// Cursor at press time.
    pub cursor: Point,
    /// Shape origin at press time.
    pub origin: Point,
    /// Line or arrow end at press time.
    pub end: Option<Point>,
}

/// State of the pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Moving the selected shape.
    DraggingSelection(DragSnapshot),
    /// Moving one endpoint of the selected line or arrow.
    DraggingEndpoint { id: ShapeId, endpoint: Endpoint },
    /// Sizing the scene's draft shape.
    DrawingDraft,
}

/// Blocking text input, used to label text shapes.
pub trait TextPrompt {
    /// Returns `None` if the user cancelled.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(&str, &str) -> Option<String>,
{
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self(message, default)
    }
}

/// Prompt that is always cancelled, for hosts without text input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl TextPrompt for NoPrompt {
    fn prompt(&mut self, _message: &str, _default: &str) -> Option<String> {
        None
    }
}

/// Manages the current tool and its gesture state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current gesture.
    pub state: GestureState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools. Any gesture in progress must be abandoned first.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = GestureState::Idle;
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Drop the gesture in progress, discarding any draft.
    pub fn abandon(&mut self, scene: &mut Scene) {
        if self.is_active() {
            log::debug!("Abandoning {:?}", self.state);
        }
        if self.state == GestureState::DrawingDraft {
            scene.set_draft(None);
        }
        self.state = GestureState::Idle;
    }

    /// Forget a drag whose shape no longer exists.
    pub fn forget_shape(&mut self, id: ShapeId) {
        let dragging = match self.state {
            GestureState::DraggingSelection(snapshot) => snapshot.id == id,
            GestureState::DraggingEndpoint { id: dragged, .. } => dragged == id,
            _ => false,
        };
        if dragging {
            self.state = GestureState::Idle;
        }
    }

    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        config: &dyn ConfigSource,
        prompt: &mut dyn TextPrompt,
        point: Point,
    ) {
        // A release outside the canvas never reached us
        self.abandon(scene);

        match self.current_tool {
            ToolKind::Select => self.begin_select(scene, point),
            ToolKind::Text => self.place_text(scene, config, prompt, point),
            tool => {
                let Some(kind) = tool.shape_kind() else {
                    return;
                };
                let at = snap_to_grid(point, config.grid_size());
                scene.set_draft(Shape::draft(kind, at, config.style()));
                self.state = GestureState::DrawingDraft;
                log::debug!("Drawing {} from {:?}", kind.name(), at);
            }
        }
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, config: &dyn ConfigSource, point: Point) {
        match self.state {
            GestureState::Idle => {}
            GestureState::DraggingSelection(snapshot) => {
                let grid = config.grid_size();
                let delta = point - snapshot.cursor;
                if let Some(shape) = scene.get_mut(snapshot.id) {
                    shape.set_origin(snap_to_grid(snapshot.origin + delta, grid));
                    if let Some(end) = snapshot.end {
                        shape.set_end_point(snap_to_grid(end + delta, grid));
                    }
                }
            }
            GestureState::DraggingEndpoint { id, endpoint } => {
                let snapped = snap_to_grid(point, config.grid_size());
                if let Some(shape) = scene.get_mut(id) {
                    match endpoint {
                        Endpoint::Start => shape.set_origin(snapped),
                        Endpoint::End => {
                            shape.set_end_point(snapped);
                        }
                    }
                }
            }
            GestureState::DrawingDraft => {
                let snapped = snap_to_grid(point, config.grid_size());
                if let Some(draft) = scene.draft_mut() {
                    draft.extend_to(snapped);
                }
            }
        }
    }

    /// Finish the gesture. A draft is committed unless it is degenerate.
    pub fn pointer_up(&mut self, scene: &mut Scene) -> Option<ShapeId> {
        match std::mem::take(&mut self.state) {
            GestureState::DrawingDraft => scene.take_draft().and_then(|draft| scene.add_shape(draft)),
            _ => None,
        }
    }

    fn begin_select(&mut self, scene: &mut Scene, point: Point) {
        if let Some((id, endpoint)) = endpoint_handle_at(scene, point) {
            log::debug!("Grabbed {endpoint:?} of {id}");
            self.state = GestureState::DraggingEndpoint { id, endpoint };
            return;
        }

        let Some(shape) = scene.hit_test(point).and_then(|id| scene.get(id)) else {
            scene.set_selection(None);
            return;
        };
        let snapshot = DragSnapshot {
            id: shape.id(),
            cursor: point,
            origin: shape.origin(),
            end: shape.end_point(),
        };
        scene.set_selection(Some(snapshot.id));
        self.state = GestureState::DraggingSelection(snapshot);
    }

    fn place_text(
        &mut self,
        scene: &mut Scene,
        config: &dyn ConfigSource,
        prompt: &mut dyn TextPrompt,
        point: Point,
    ) {
        let Some(content) = prompt
            .prompt(TEXT_PROMPT_MESSAGE, TEXT_PROMPT_DEFAULT)
            .filter(|content| !content.is_empty())
        else {
            log::debug!("Text prompt cancelled");
            return;
        };
        let mut text = Text::new(snap_to_grid(point, config.grid_size()), content);
        text.style = config.style();
        scene.add_shape(Shape::Text(text));
        self.current_tool = ToolKind::Select;
    }
}

/// Endpoint of the selected line or arrow within handle reach of `point`,
/// the nearer one if both are.
fn endpoint_handle_at(scene: &Scene, point: Point) -> Option<(ShapeId, Endpoint)> {
    let shape = scene.selected()?;
    let end = shape.end_point()?;
    let start_distance = point.distance(shape.origin());
    let end_distance = point.distance(end);
    let (endpoint, distance) = if end_distance <= start_distance {
        (Endpoint::End, end_distance)
    } else {
        (Endpoint::Start, start_distance)
    };
    (distance <= HANDLE_HIT_TOLERANCE).then_some((shape.id(), endpoint))
}
