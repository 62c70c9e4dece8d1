//! Transient status message shown after an export.

use std::time::Duration;

// Use web-time on WASM, std::time otherwise
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// How long a status message stays visible.
pub const STATUS_DURATION: Duration = Duration::from_secs(2);

/// A single message that expires after [`STATUS_DURATION`].
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current message.
    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some((message.into(), now));
    }

    /// The message, if it has not expired yet.
    pub fn current(&self) -> Option<&str> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&str> {
        let (text, shown) = self.message.as_ref()?;
        (now.saturating_duration_since(*shown) < STATUS_DURATION).then_some(text.as_str())
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}
