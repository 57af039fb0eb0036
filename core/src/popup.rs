//! Hover popup visibility.

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    Hidden,
    Visible,
}

impl PopupState {
    #[must_use]
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }
}

/// Two-state machine driven by pointer enter/leave on the bar.
///
/// The show/hide side effect is passed in by the caller and the state only
/// changes once it succeeds, so a failed map leaves the popup hidden and the
/// next enter event retries. Events for the state already reached are no-ops.
#[derive(Debug, Default)]
pub struct PopupController {
    state: PopupState,
}

impl PopupController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> PopupState {
        self.state
    }

    /// Pointer entered the bar. Returns `true` if the popup was shown.
    pub fn pointer_enter<F>(&mut self, show: F) -> Result<bool>
    where
        F: FnOnce() -> Result<()>,
    {
        if self.state.is_visible() {
            return Ok(false);
        }
        show()?;
        self.state = PopupState::Visible;
        Ok(true)
    }

    /// Pointer left the bar. Returns `true` if the popup was hidden.
    pub fn pointer_leave<F>(&mut self, hide: F) -> Result<bool>
    where
        F: FnOnce() -> Result<()>,
    {
        if !self.state.is_visible() {
            return Ok(false);
        }
        hide()?;
        self.state = PopupState::Hidden;
        Ok(true)
    }
}
