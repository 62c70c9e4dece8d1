//! Raster export: reading the drawn frame back and encoding it as PNG.

use vectorstudio_core::config::ConfigSource;
use vectorstudio_core::editor::Editor;
use vectorstudio_core::export::{ExportError, ExportFormat, ExportSink};

/// Raw RGBA pixels of a rendered frame, row-major, 8 bits per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelBuffer {
    pub fn new(rgba_data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            rgba_data,
            width,
            height,
        }
    }

    /// Byte length a buffer of this size must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// A surface whose current pixels can be read back.
pub trait FrameReadback {
    fn read_pixels(&self) -> Result<PixelBuffer, ExportError>;
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>, ExportError> {
    if pixels.width == 0 || pixels.height == 0 {
        return Err(ExportError::Png(format!(
            "empty frame {}x{}",
            pixels.width, pixels.height
        )));
    }
    if pixels.rgba_data.len() != pixels.expected_len() {
        return Err(ExportError::Png(format!(
            "expected {} bytes for {}x{}, got {}",
            pixels.expected_len(),
            pixels.width,
            pixels.height,
            pixels.rgba_data.len()
        )));
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixels.width, pixels.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Png(e.to_string()))?;
        writer
            .write_image_data(&pixels.rgba_data)
            .map_err(|e| ExportError::Png(e.to_string()))?;
        writer.finish().map_err(|e| ExportError::Png(e.to_string()))?;
    }

    Ok(png_data)
}

/// Read the frame back, encode it and hand it to `sink`.
pub fn export_png<C: ConfigSource>(
    editor: &mut Editor<C>,
    readback: &dyn FrameReadback,
    sink: &mut dyn ExportSink,
) -> Result<(), ExportError> {
    let pixels = readback
        .read_pixels()
        .inspect_err(|e| log::error!("PNG export failed: {e}"))?;
    let png_data = encode_png(&pixels).inspect_err(|e| log::error!("PNG export failed: {e}"))?;
    editor.deliver(ExportFormat::Png, &png_data, sink)
}

/// Export in `format`. The SVG path does not touch the frame.
pub fn export<C: ConfigSource>(
    editor: &mut Editor<C>,
    format: ExportFormat,
    readback: &dyn FrameReadback,
    sink: &mut dyn ExportSink,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Png => export_png(editor, readback, sink),
        ExportFormat::Svg => editor.export_svg(sink),
    }
}
