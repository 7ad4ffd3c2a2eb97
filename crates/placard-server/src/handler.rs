//! SSH connection handling
//!
//! One [`SessionHandler`] per accepted connection, produced by the
//! [`GreeterFactory`]'s `new_client`. Every handler owns a fresh [`Page`]:
//! sessions never share or pool view state, so no locking exists on the
//! per-session path.

use std::net::SocketAddr;
use std::sync::Arc;

use placard_app::{KeyInput, Page, PageAction, PageEvent};
use russh::server::{self, Auth, Msg, Session};
use russh::{Channel, ChannelId, CryptoVec, Pty};

use crate::registry::SessionEntry;
use crate::{ServerError, SharedState, ansi};

/// Per-connection handler factory.
///
/// The single place sessions are created; every accepted connection gets
/// its own page instance here.
pub struct GreeterFactory {
    shared: Arc<SharedState>,
    greeting: String,
}

impl GreeterFactory {
    pub(crate) fn new(shared: Arc<SharedState>, greeting: String) -> Self {
        Self { shared, greeting }
    }
}

impl server::Server for GreeterFactory {
    type Handler = SessionHandler;

    fn new_client(&mut self, peer_addr: Option<SocketAddr>) -> Self::Handler {
        let session_id = self.shared.connection_opened();
        tracing::info!(session_id, ?peer_addr, "connection opened");

        SessionHandler {
            shared: Arc::clone(&self.shared),
            page: Page::new(self.greeting.clone()),
            session_id,
            peer_addr,
            pty_size: None,
            screen: None,
        }
    }
}

/// Per-connection SSH handler driving one page.
pub struct SessionHandler {
    shared: Arc<SharedState>,
    page: Page,
    session_id: u64,
    peer_addr: Option<SocketAddr>,
    pty_size: Option<(u16, u16)>,
    screen: Option<ChannelId>,
}

/// What one dispatched event means for the connection.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// Nothing to write.
    Idle,
    /// Redraw the frame in place.
    Redraw(Vec<u8>),
    /// Restore the remote screen and end the session.
    Close(Vec<u8>),
}

/// Feed one event to a session's page and compute the bytes to write back.
pub(crate) fn step(page: &mut Page, event: PageEvent) -> StepOutcome {
    for action in page.handle(event) {
        match action {
            PageAction::Render => {
                return StepOutcome::Redraw(ansi::frame(&page.view()).into_bytes());
            },
            PageAction::Quit => {
                let mut out = String::new();
                out.push_str(ansi::LEAVE_ALT_SCREEN);
                out.push_str(ansi::SHOW_CURSOR);
                return StepOutcome::Close(out.into_bytes());
            },
        }
    }
    StepOutcome::Idle
}

/// Decode raw channel bytes into key events, preserving arrival order.
pub(crate) fn decode_keys(data: &[u8]) -> Vec<KeyInput> {
    data.iter()
        .filter_map(|&byte| match byte {
            0x03 => Some(KeyInput::CtrlC),
            b'\r' | b'\n' => Some(KeyInput::Enter),
            0x1b => Some(KeyInput::Esc),
            byte if byte.is_ascii_graphic() || byte == b' ' => Some(KeyInput::Char(byte as char)),
            _ => None,
        })
        .collect()
}

impl SessionHandler {
    fn dispatch(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
        event: PageEvent,
    ) -> Result<(), ServerError> {
        match step(&mut self.page, event) {
            StepOutcome::Idle => Ok(()),
            StepOutcome::Redraw(bytes) => {
                session.data(channel, CryptoVec::from_slice(&bytes))?;
                Ok(())
            },
            StepOutcome::Close(bytes) => {
                tracing::info!(session_id = self.session_id, "quit key received, ending session");
                session.data(channel, CryptoVec::from_slice(&bytes))?;
                session.eof(channel)?;
                session.close(channel)?;
                self.screen = None;
                self.shared.unregister_screen(self.session_id);
                Ok(())
            },
        }
    }
}

#[async_trait::async_trait]
impl server::Handler for SessionHandler {
    type Error = ServerError;

    async fn auth_none(&mut self, _user: &str) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        if self.shared.at_capacity() {
            tracing::info!(session_id = self.session_id, "session cap reached, refusing channel");
            return Ok(false);
        }

        tracing::debug!(
            session_id = self.session_id,
            channel_id = ?channel.id(),
            "session channel opened"
        );
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        _channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        tracing::debug!(session_id = self.session_id, term, col_width, row_height, "pty requested");
        self.pty_size = Some((col_width as u16, row_height as u16));
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let Some((cols, rows)) = self.pty_size else {
            // No PTY was negotiated: nothing interactive to drive.
            session
                .data(channel, CryptoVec::from_slice(b"Requires an interactive terminal.\r\n"))?;
            session.close(channel)?;
            return Ok(());
        };

        self.screen = Some(channel);
        self.shared
            .register_screen(self.session_id, SessionEntry { handle: session.handle(), channel });

        let _ = self.page.handle(PageEvent::Resize(cols, rows));

        let mut out = String::new();
        out.push_str(ansi::ENTER_ALT_SCREEN);
        out.push_str(ansi::HIDE_CURSOR);
        out.push_str(&ansi::frame(&self.page.view()));
        session.data(channel, CryptoVec::from_slice(out.as_bytes()))?;

        tracing::info!(session_id = self.session_id, cols, rows, "interactive session started");
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.screen != Some(channel) {
            return Ok(());
        }

        for key in decode_keys(data) {
            self.dispatch(channel, session, PageEvent::Key(key))?;
            if self.page.is_terminated() {
                break;
            }
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.screen != Some(channel) {
            return Ok(());
        }
        self.dispatch(channel, session, PageEvent::Resize(col_width as u16, row_height as u16))
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.screen == Some(channel) {
            let _ = self.page.handle(PageEvent::Disconnect);
            self.screen = None;
            self.shared.unregister_screen(self.session_id);
        }
        Ok(())
    }
}

impl Drop for SessionHandler {
    fn drop(&mut self) {
        self.shared.unregister_screen(self.session_id);
        self.shared.connection_closed();
        tracing::info!(
            session_id = self.session_id,
            peer_addr = ?self.peer_addr,
            "connection closed"
        );
    }
}
