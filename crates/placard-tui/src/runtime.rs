//! Async runtime
//!
//! Event loop that drives terminal I/O for one local session. Raw mode and
//! the alternate screen are acquired on construction and restored in `Drop`
//! on every exit path, including panics.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use placard_app::{DEFAULT_GREETING, KeyInput, Page, PageAction, PageEvent};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Async runtime for the local TUI.
///
/// Owns the terminal and one [`Page`]. The only suspension point is waiting
/// for the next input event; each render reflects exactly the state after
/// the immediately preceding update.
pub struct Runtime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    page: Page,
}

impl Runtime {
    /// Acquire the terminal and create a runtime for the greeting page.
    ///
    /// Fails before the event loop starts when stdout is not an interactive
    /// terminal.
    pub fn new() -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal, page: Page::new(DEFAULT_GREETING) })
    }

    /// Run the event loop until the page terminates.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        self.render()?;

        let mut event_stream = EventStream::new();

        while let Some(maybe_event) = event_stream.next().await {
            let Some(page_event) = convert_event(maybe_event?) else {
                continue;
            };

            for action in self.page.handle(page_event) {
                match action {
                    PageAction::Render => self.render()?,
                    PageAction::Quit => {
                        tracing::debug!("quit key received, ending local session");
                        return Ok(());
                    },
                }
            }
        }

        Ok(())
    }

    /// Render the UI.
    fn render(&mut self) -> Result<(), RuntimeError> {
        self.terminal.draw(|frame| ui::render(frame, &self.page))?;
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Convert a crossterm event into a page event.
///
/// Only key presses count as input; release/repeat events and unmapped keys
/// produce nothing.
fn convert_event(event: Event) -> Option<PageEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            convert_key(key.code, key.modifiers).map(PageEvent::Key)
        },
        Event::Resize(cols, rows) => Some(PageEvent::Resize(cols, rows)),
        _ => None,
    }
}

fn convert_key(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyInput> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(KeyInput::CtrlC),
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Esc => Some(KeyInput::Esc),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventState};

    use super::*;

    #[test]
    fn ctrl_c_normalizes_to_quit_key() {
        assert_eq!(
            convert_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(KeyInput::CtrlC)
        );
    }

    #[test]
    fn plain_c_is_ordinary_input() {
        assert_eq!(convert_key(KeyCode::Char('c'), KeyModifiers::NONE), Some(KeyInput::Char('c')));
    }

    #[test]
    fn key_release_events_are_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(convert_event(release), None);
    }

    #[test]
    fn resize_maps_to_resize_event() {
        assert_eq!(convert_event(Event::Resize(100, 30)), Some(PageEvent::Resize(100, 30)));
    }
}
