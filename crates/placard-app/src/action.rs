//! Page actions
//!
//! Actions produced by the page state machine for a runtime to execute.

/// Actions produced by the page state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    /// Redraw the frame, replacing the previous one in place.
    Render,

    /// End the session.
    Quit,
}
