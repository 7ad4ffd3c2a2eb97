//! Server error types.

use std::io;

use thiserror::Error;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (unreadable host key, invalid listen address).
    ///
    /// Fatal before startup. Fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Listener/transport error (bind failure, accept loop failure).
    ///
    /// Fatal for the process when it hits the listener; a single session's
    /// transport failure never surfaces here.
    #[error("transport error: {0}")]
    Transport(String),

    /// SSH protocol error inside one session.
    ///
    /// Tears down that session only; the server keeps serving others.
    #[error("ssh error: {0}")]
    Ssh(#[from] russh::Error),
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
