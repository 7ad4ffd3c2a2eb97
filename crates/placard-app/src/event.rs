//! Page events
//!
//! Events fed into the page state machine. Both runtimes translate their
//! transport-specific input (crossterm events, SSH channel bytes) into this
//! one type, so the state machine never sees a library message union.

/// Key input events, normalized across transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Ctrl+C, the quit key.
    CtrlC,
    /// Printable character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Esc,
}

/// Events processed by the page state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// The connection behind this session went away.
    Disconnect,
}
