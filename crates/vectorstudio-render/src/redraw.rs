//! Continuous redraw loop with a cancellation handle.
//!
//! The host owns the scheduling (a `requestAnimationFrame` chain in the
//! browser, a plain loop elsewhere) and calls [`RedrawTask::tick`] once per
//! frame until it returns [`ControlFlow::Break`].

use crate::renderer::{RenderContext, Renderer};
use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

/// Shared flag that stops a [`RedrawTask`] on its next tick.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Rc<Cell<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Redraws the whole frame on every tick.
#[derive(Debug, Default)]
pub struct RedrawTask {
    cancel: CancelHandle,
    frames: u64,
}

impl RedrawTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that can stop this task from elsewhere, e.g. a teardown hook.
    pub fn handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draw one frame unless cancelled. `Continue` means the host should
    /// schedule another tick.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        ctx: &RenderContext,
    ) -> ControlFlow<()> {
        if self.cancel.is_cancelled() {
            log::debug!("Redraw loop stopped after {} frames", self.frames);
            return ControlFlow::Break(());
        }
        renderer.build_scene(ctx);
        self.frames += 1;
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_list::DisplayList;
    use kurbo::Size;
    use vectorstudio_core::scene::Scene;

    #[test]
    fn test_tick_draws_until_cancelled() {
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Size::new(40.0, 40.0), 20.0);
        let mut list = DisplayList::new();
        let mut task = RedrawTask::new();
        let handle = task.handle();

        assert_eq!(task.tick(&mut list, &ctx), ControlFlow::Continue(()));
        assert_eq!(task.tick(&mut list, &ctx), ControlFlow::Continue(()));
        assert_eq!(task.frames(), 2);
        assert!(!list.is_empty());

        handle.cancel();
        list.reset();
        assert_eq!(task.tick(&mut list, &ctx), ControlFlow::Break(()));
        assert_eq!(task.frames(), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn test_handles_share_state() {
        let task = RedrawTask::new();
        let a = task.handle();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
        assert!(task.handle().is_cancelled());
    }

    #[test]
    fn test_dyn_renderer() {
        let scene = Scene::new();
        let ctx = RenderContext::new(&scene, Size::new(20.0, 20.0), 20.0);
        let mut list = DisplayList::new();
        let renderer: &mut dyn Renderer = &mut list;
        let mut task = RedrawTask::new();
        assert!(task.tick(renderer, &ctx).is_continue());
    }
}
