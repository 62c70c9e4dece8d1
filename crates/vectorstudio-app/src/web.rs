//! WebAssembly entry point and the browser host.
//!
//! The page provides a `mainCanvas` inside `canvas-container`, the property
//! inputs (`gridSize`, `fillColor`, `strokeColor`, `strokeWidth`) and the
//! `status` / `coords` readouts. Page scripts drive the exported
//! [`VectorStudio`] handle from the toolbar buttons.

use kurbo::{BezPath, PathEl, Point, Rect, Size};
use peniko::Color;
use std::cell::RefCell;
use std::rc::Rc;
use vectorstudio_core::{
    ConfigSource, Editor, ExportError, ExportFormat, ExportSink, FormValues, MouseButton,
    PointerEvent, SerializableColor, ShapeStyle, StyleEdit, TextPrompt, ToolKind,
};
use vectorstudio_render::{
    CancelHandle, FontSpec, FrameReadback, PixelBuffer, RedrawTask, RenderContext, Renderer,
    RendererError, Surface, render_frame,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlInputElement, MouseEvent, Window,
};

const CANVAS_ID: &str = "mainCanvas";
const CONTAINER_ID: &str = "canvas-container";
const STATUS_ID: &str = "status";
const COORDS_ID: &str = "coords";
const GRID_INPUT: &str = "gridSize";
const FILL_INPUT: &str = "fillColor";
const STROKE_INPUT: &str = "strokeColor";
const WIDTH_INPUT: &str = "strokeWidth";

fn css_color(color: Color) -> String {
    let c = color.to_rgba8();
    format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, f64::from(c.a) / 255.0)
}

fn js_error(context: &str, err: impl std::fmt::Debug) -> JsValue {
    JsValue::from_str(&format!("{context}: {err:?}"))
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has the wrong type")))
}

/// Configuration read live from the property inputs.
pub struct DomConfig {
    document: Document,
}

impl DomConfig {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        element(&self.document, id).ok()
    }

    fn value(&self, id: &str) -> String {
        self.input(id).map(|input| input.value()).unwrap_or_default()
    }

    fn form_values(&self) -> FormValues {
        FormValues {
            grid_size: self.value(GRID_INPUT),
            fill_color: self.value(FILL_INPUT),
            stroke_color: self.value(STROKE_INPUT),
            stroke_width: self.value(WIDTH_INPUT),
        }
    }

    /// Show the selected shape's style in the inputs.
    pub fn reflect(&self, style: &ShapeStyle) {
        let fields = [
            (FILL_INPUT, style.fill_color.to_hex()),
            (STROKE_INPUT, style.stroke_color.to_hex()),
            (WIDTH_INPUT, style.stroke_width.to_string()),
        ];
        for (id, value) in fields {
            if let Some(input) = self.input(id) {
                input.set_value(&value);
            }
        }
    }
}

impl ConfigSource for DomConfig {
    fn grid_size(&self) -> f64 {
        self.form_values().grid_size()
    }

    fn fill_color(&self) -> SerializableColor {
        self.form_values().fill_color()
    }

    fn stroke_color(&self) -> SerializableColor {
        self.form_values().stroke_color()
    }

    fn stroke_width(&self) -> f64 {
        self.form_values().stroke_width()
    }
}

/// Blocking `window.prompt`.
struct DomPrompt {
    window: Window,
}

impl TextPrompt for DomPrompt {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self.window
            .prompt_with_message_and_default(message, default)
            .ok()
            .flatten()
    }
}

/// Downloads exported files through a temporary anchor element.
struct DownloadSink {
    document: Document,
}

impl ExportSink for DownloadSink {
    fn save(&mut self, filename: &str, mime_type: &str, data: &[u8]) -> Result<(), ExportError> {
        let sink_error = |err: JsValue| ExportError::Sink {
            filename: filename.to_string(),
            reason: format!("{err:?}"),
        };

        // Create a Blob from the data
        let uint8_array = js_sys::Uint8Array::from(data);
        let blob_parts = js_sys::Array::new();
        blob_parts.push(&uint8_array);

        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime_type);

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)
            .map_err(sink_error)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(sink_error)?;

        // Create and click download link
        let anchor = self
            .document
            .create_element("a")
            .map_err(sink_error)?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|el| sink_error(el.into()))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();

        web_sys::Url::revoke_object_url(&url).ok();
        Ok(())
    }
}

/// Surface backed by a canvas 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RendererError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| RendererError::InitFailed(format!("{e:?}")))?
            .ok_or_else(|| RendererError::InitFailed("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RendererError::InitFailed("not a 2d context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn trace(&self, path: &BezPath) {
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(p1, p2) => self.ctx.quadratic_curve_to(p1.x, p1.y, p2.x, p2.y),
                PathEl::CurveTo(p1, p2, p3) => {
                    self.ctx.bezier_curve_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y)
                }
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, color: Color, size: Size) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill_rect(0.0, 0.0, size.width, size.height);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.trace(path);
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill();
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, dash: &[f64]) {
        self.trace(path);
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(width);
        let segments: js_sys::Array = dash.iter().map(|d| JsValue::from_f64(*d)).collect();
        if let Err(e) = self.ctx.set_line_dash(&segments) {
            log::warn!("Failed to set line dash: {e:?}");
        }
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx
            .fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        self.ctx.set_font(&font.css());
        self.ctx.set_fill_style_str(&css_color(color));
        if let Err(e) = self.ctx.fill_text(text, origin.x, origin.y) {
            log::warn!("Failed to draw text: {e:?}");
        }
    }
}

impl Renderer for CanvasSurface {
    fn build_scene(&mut self, ctx: &RenderContext) {
        render_frame(self, ctx);
    }
}

impl FrameReadback for CanvasSurface {
    fn read_pixels(&self) -> Result<PixelBuffer, ExportError> {
        let image = self
            .ctx
            .get_image_data(
                0.0,
                0.0,
                f64::from(self.canvas.width()),
                f64::from(self.canvas.height()),
            )
            .map_err(|e| ExportError::Readback(format!("{e:?}")))?;
        Ok(PixelBuffer::new(image.data().0, image.width(), image.height()))
    }
}

/// State shared by the event handlers and the redraw loop.
struct Host {
    editor: Editor<DomConfig>,
    surface: CanvasSurface,
    document: Document,
    window: Window,
    container: HtmlElement,
    status: Option<HtmlElement>,
    coords: Option<HtmlElement>,
}

impl Host {
    /// Match the canvas to its container. Shapes keep their coordinates.
    fn fit_to_container(&mut self) {
        let width = self.container.offset_width().max(0) as u32;
        let height = self.container.offset_height().max(0) as u32;
        self.surface.canvas().set_width(width);
        self.surface.canvas().set_height(height);
        self.editor
            .resize(Size::new(f64::from(width), f64::from(height)));
    }

    fn pointer(&mut self, event: PointerEvent) {
        self.editor.handle_pointer_event(event);
        if let Some(coords) = &self.coords {
            coords.set_inner_text(&self.editor.cursor_readout());
        }
    }

    fn reflect_selection(&self) {
        if let Some(style) = self.editor.selection_style() {
            self.editor.config().reflect(style);
        }
    }

    fn show_status(&self) {
        let Some(status) = &self.status else {
            return;
        };
        let opacity = match self.editor.status_message() {
            Some(message) => {
                status.set_inner_text(message);
                "1"
            }
            None => "0",
        };
        status.style().set_property("opacity", opacity).ok();
    }

    fn set_tool(&mut self, tool: ToolKind) {
        self.editor.set_tool(tool);
        self.sync_cursor();
    }

    /// Match the canvas cursor to the active tool, which text placement
    /// switches back to Select on its own.
    fn sync_cursor(&self) {
        self.surface
            .canvas()
            .style()
            .set_property("cursor", self.editor.tool().cursor())
            .ok();
    }

    fn export(&mut self, format: ExportFormat) -> Result<(), ExportError> {
        let mut sink = DownloadSink {
            document: self.document.clone(),
        };
        vectorstudio_render::export(&mut self.editor, format, &self.surface, &mut sink)
    }
}

fn mouse_position(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()))
}

fn listen_mouse(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(MouseEvent) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn install_listeners(host: &Rc<RefCell<Host>>) -> Result<(), JsValue> {
    let (canvas, window, document) = {
        let host = host.borrow();
        (
            host.surface.canvas().clone(),
            host.window.clone(),
            host.document.clone(),
        )
    };

    let h = host.clone();
    listen_mouse(&canvas, "mousedown", move |event| {
        let Some(button) = MouseButton::from_dom(event.button()) else {
            return;
        };
        let mut host = h.borrow_mut();
        host.pointer(PointerEvent::Down {
            position: mouse_position(&event),
            button,
        });
        host.sync_cursor();
        host.reflect_selection();
    })?;

    let h = host.clone();
    listen_mouse(&canvas, "mousemove", move |event| {
        h.borrow_mut().pointer(PointerEvent::Move {
            position: mouse_position(&event),
        });
    })?;

    let h = host.clone();
    listen_mouse(&canvas, "mouseup", move |event| {
        let button = MouseButton::from_dom(event.button()).unwrap_or_default();
        h.borrow_mut().pointer(PointerEvent::Up {
            position: mouse_position(&event),
            button,
        });
    })?;

    // Property edits apply to the selected shape
    for id in [FILL_INPUT, STROKE_INPUT, WIDTH_INPUT] {
        let input: HtmlInputElement = element(&document, id)?;
        let h = host.clone();
        listen(&input, "change", move |_| {
            let mut host = h.borrow_mut();
            let config = host.editor.config();
            let edit = match id {
                FILL_INPUT => StyleEdit::fill(config.fill_color()),
                STROKE_INPUT => StyleEdit::stroke(config.stroke_color()),
                _ => StyleEdit::width(config.stroke_width()),
            };
            host.editor.apply_style(&edit);
        })?;
    }

    let h = host.clone();
    listen(&window, "resize", move |_| h.borrow_mut().fit_to_container())?;

    Ok(())
}

fn start_redraw_loop(host: Rc<RefCell<Host>>, mut task: RedrawTask) -> Result<(), JsValue> {
    let window = host.borrow().window.clone();
    let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = frame.clone();
    let scheduler = window.clone();

    *frame.borrow_mut() = Some(Closure::new(move || {
        let mut guard = host.borrow_mut();
        let Host {
            editor, surface, ..
        } = &mut *guard;
        let ctx = RenderContext::for_editor(editor);
        if task.tick(surface, &ctx).is_break() {
            // Drop our handle so the closure is released after returning
            let _ = next.borrow_mut().take();
            return;
        }
        guard.show_status();
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(e) = scheduler.request_animation_frame(callback.as_ref().unchecked_ref()) {
                log::error!("Failed to schedule frame: {e:?}");
            }
        }
    }));

    if let Some(callback) = frame.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}

/// Handle to a running studio, driven by the page's toolbar.
#[wasm_bindgen]
pub struct VectorStudio {
    host: Rc<RefCell<Host>>,
    cancel: CancelHandle,
}

#[wasm_bindgen]
impl VectorStudio {
    /// Attach to the page's canvas and start drawing.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<VectorStudio, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = element(&document, CANVAS_ID)?;
        let container: HtmlElement = element(&document, CONTAINER_ID)?;
        let surface = CanvasSurface::new(canvas).map_err(|e| js_error("Canvas", e))?;
        let editor = Editor::new(DomConfig::new(document.clone())).with_prompt(DomPrompt {
            window: window.clone(),
        });

        let host = Rc::new(RefCell::new(Host {
            editor,
            surface,
            status: element(&document, STATUS_ID).ok(),
            coords: element(&document, COORDS_ID).ok(),
            document,
            window,
            container,
        }));
        host.borrow_mut().fit_to_container();
        install_listeners(&host)?;

        let task = RedrawTask::new();
        let cancel = task.handle();
        start_redraw_loop(host.clone(), task)?;

        log::info!("Vector Studio ready");
        Ok(VectorStudio { host, cancel })
    }

    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool: ToolKind = name.parse().map_err(|e| js_error("Tool", e))?;
        self.host.borrow_mut().set_tool(tool);
        Ok(())
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&self) {
        self.host.borrow_mut().editor.delete_selected();
    }

    /// Remove every shape after the user confirms.
    pub fn clear(&self) {
        let mut host = self.host.borrow_mut();
        if host
            .window
            .confirm_with_message("Clear Canvas?")
            .unwrap_or(false)
        {
            host.editor.clear_all();
        }
    }

    /// Export as `"png"` or `"svg"`.
    pub fn export(&self, format: &str) -> Result<(), JsValue> {
        let format = match format {
            "png" => ExportFormat::Png,
            "svg" => ExportFormat::Svg,
            other => return Err(JsValue::from_str(&format!("unknown export format {other:?}"))),
        };
        self.host
            .borrow_mut()
            .export(format)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stop the redraw loop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Initialize logging for the WASM module.
#[wasm_bindgen(start)]
pub fn run_wasm() -> Result<(), JsValue> {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info).map_err(|e| js_error("Logger", e))?;

    log::info!("Starting Vector Studio (WASM)");
    Ok(())
}
