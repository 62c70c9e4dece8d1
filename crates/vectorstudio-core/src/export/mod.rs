//! Export formats, the sink that receives exported files and export errors.

pub mod svg;

pub use svg::to_svg;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base name of every exported file.
pub const EXPORT_BASENAME: &str = "vector_diagram";

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the vector markup failed
    #[error("SVG write error: {0}")]
    Svg(String),

    /// Encoding the raster image failed
    #[error("PNG encode error: {0}")]
    Png(String),

    /// No pixels could be read back from the drawing surface
    #[error("Frame readback failed: {0}")]
    Readback(String),

    /// The sink refused the file
    #[error("Failed to save {filename}: {reason}")]
    Sink { filename: String, reason: String },
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    /// Suggested file name, e.g. `vector_diagram.svg`.
    pub fn filename(self) -> String {
        format!("{EXPORT_BASENAME}.{}", self.extension())
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    /// Status line text after a successful export.
    pub fn status_message(self) -> String {
        format!("EXPORTED {}", self.extension().to_uppercase())
    }
}

/// Destination for exported files: a download, a directory, a buffer.
pub trait ExportSink {
    fn save(&mut self, filename: &str, mime_type: &str, data: &[u8]) -> Result<(), ExportError>;
}

/// A file handed to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Sink that keeps exported files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<ExportedFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ExportedFile> {
        self.files.last()
    }
}

impl ExportSink for MemorySink {
    fn save(&mut self, filename: &str, mime_type: &str, data: &[u8]) -> Result<(), ExportError> {
        self.files.push(ExportedFile {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            data: data.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Svg.filename(), "vector_diagram.svg");
        assert_eq!(ExportFormat::Png.filename(), "vector_diagram.png");
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
        assert_eq!(ExportFormat::Png.status_message(), "EXPORTED PNG");
        assert_eq!(ExportFormat::Svg.status_message(), "EXPORTED SVG");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.save("a.svg", "image/svg+xml", b"<svg/>").unwrap();
        let file = sink.last().unwrap();
        assert_eq!(file.filename, "a.svg");
        assert_eq!(file.data, b"<svg/>");
    }

    #[test]
    fn test_format_serde() {
        let format: ExportFormat = serde_json::from_str("\"png\"").unwrap();
        assert_eq!(format, ExportFormat::Png);
    }
}
