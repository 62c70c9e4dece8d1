//! Vector Studio Application
//!
//! Hosts for the editor: a headless session runner that replays scripts
//! and the browser canvas host.

mod session;

pub use session::{
    AppError, FileSink, QueuedPrompt, Script, Session, SessionReport, Step, parse_args, run_script,
};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{VectorStudio, run_wasm};
