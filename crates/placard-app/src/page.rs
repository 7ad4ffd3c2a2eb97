//! Page state machine
//!
//! One greeting screen: a bordered text box and a quit hint. The state
//! machine has exactly two phases, Running and Terminated, with a single
//! transition triggered by the quit key. Each session owns an exclusive
//! `Page`; instances are never shared or reused across sessions.

use crate::{KeyInput, PageAction, PageEvent};

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Live and processing events.
    Running,
    /// Quit requested or connection gone. No transition leaves this phase.
    Terminated,
}

/// The greeting page.
///
/// `text` is fixed at creation and must be non-empty; rendering is a pure
/// function of it. Terminal size is recorded from resize events for
/// bookkeeping but does not influence the frame.
#[derive(Debug, Clone)]
pub struct Page {
    text: String,
    phase: Phase,
    terminal_size: (u16, u16),
}

impl Page {
    /// Create a page in the Running phase.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        debug_assert!(!text.is_empty(), "page text must be non-empty");
        Self { text, phase: Phase::Running, terminal_size: (80, 24) }
    }

    /// Render the frame.
    ///
    /// The borders span `text.len() + 4` marker bytes so the text sits
    /// between `* ` and ` *`. Identical text yields byte-identical output;
    /// there is no trailing newline.
    pub fn view(&self) -> String {
        let border = "*".repeat(self.text.len() + 4);
        format!("{border}\n* {} *\n{border}\n\nPress Ctrl+C to exit", self.text)
    }

    /// Process an event and return actions for the runtime.
    ///
    /// Ctrl+C terminates the session with no further render. Every other
    /// key leaves the state untouched. Once Terminated, all events are
    /// absorbed without actions.
    pub fn handle(&mut self, event: PageEvent) -> Vec<PageAction> {
        if self.phase == Phase::Terminated {
            return vec![];
        }

        match event {
            PageEvent::Key(KeyInput::CtrlC) => {
                self.phase = Phase::Terminated;
                vec![PageAction::Quit]
            },
            PageEvent::Key(_) => vec![],
            PageEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![PageAction::Render]
            },
            PageEvent::Disconnect => {
                self.phase = Phase::Terminated;
                vec![]
            },
        }
    }

    /// Greeting text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the session has ended.
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Last recorded terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}
