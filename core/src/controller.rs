//! The single rendering task.
//!
//! Status updates from the update loop and window-system events both arrive
//! on one channel and are handled in order, so only this task ever touches
//! the drawing surface.

use crate::error::Result;
use crate::popup::{PopupController, PopupState};
use crate::render::{BarRenderer, Surface, Target};
use crate::status::PowerStatus;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Window-system notifications the bar reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    PointerEnter,
    PointerLeave,
    Expose,
    Map,
}

/// Everything the rendering task consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarEvent {
    /// Result of one poll; `None` when the poll failed.
    Status(Option<PowerStatus>),
    Window(WindowEvent),
}

/// State the renderer needs between passes.
#[derive(Debug, Default)]
pub struct RenderState {
    /// Last published status, `None` until a poll succeeds
    pub current: Option<PowerStatus>,
    pub popup: PopupController,
}

/// Owns the surface and dispatches [`BarEvent`]s to it.
pub struct BarController<S> {
    renderer: BarRenderer,
    surface: S,
    state: RenderState,
}

impl<S: Surface> BarController<S> {
    #[must_use]
    pub fn new(renderer: BarRenderer, surface: S) -> Self {
        Self {
            renderer,
            surface,
            state: RenderState::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns surface errors from the redraw or popup show/hide it triggered.
    pub fn handle(&mut self, event: BarEvent) -> Result<()> {
        match event {
            BarEvent::Status(status) => {
                self.state.current = status;
                self.redraw()
            }
            BarEvent::Window(WindowEvent::PointerEnter) => {
                let surface = &mut self.surface;
                if self.state.popup.pointer_enter(|| surface.show_window(Target::Popup))? {
                    self.redraw()?;
                }
                Ok(())
            }
            BarEvent::Window(WindowEvent::PointerLeave) => {
                let surface = &mut self.surface;
                if self.state.popup.pointer_leave(|| surface.hide_window(Target::Popup))? {
                    self.surface.flush()?;
                }
                Ok(())
            }
            BarEvent::Window(WindowEvent::Expose | WindowEvent::Map) => self.redraw(),
        }
    }

    /// Render the last known status with the current popup state.
    ///
    /// # Errors
    ///
    /// Returns the first surface error of the pass.
    pub fn redraw(&mut self) -> Result<()> {
        let popup: PopupState = self.state.popup.state();
        self.renderer
            .render(&mut self.surface, self.state.current.as_ref(), popup)?;
        self.surface.flush()
    }

    /// Consume events until every sender is dropped.
    ///
    /// Errors abort only the pass that produced them.
    pub async fn run(mut self, mut events: mpsc::Receiver<BarEvent>) {
        while let Some(event) = events.recv().await {
            debug!(?event, "bar event");
            if let Err(e) = self.handle(event) {
                error!("Render pass failed: {}", e);
            }
        }
        debug!("event channel closed, renderer exiting");
    }
}
