//! Placard SSH session server.
//!
//! Serves the greeting screen to remote SSH users. Every accepted
//! connection gets its own [`placard_app::Page`] instance and an
//! independent render loop over the connection's channel; the server itself
//! only owns the listener and a registry of live sessions for shutdown.
//!
//! # Components
//!
//! - [`ServerConfig`]: explicit configuration with documented defaults
//! - [`Server`]: binds the listener and runs the accept loop until a
//!   shutdown signal, then drains in-flight sessions within a grace period
//! - [`GreeterFactory`] / [`SessionHandler`]: per-connection SSH handling
//! - [`SessionRegistry`]: session handles for forced shutdown

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod ansi;
mod error;
mod handler;
mod registry;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub use error::ServerError;
pub use handler::{GreeterFactory, SessionHandler};
use placard_app::DEFAULT_GREETING;
use rand::rngs::OsRng;
pub use registry::{SessionEntry, SessionRegistry};
use russh::server::Server as _;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Server configuration.
///
/// Defaults match the original deployment: listen on `localhost:2222`,
/// allow 40 concurrent sessions, disconnect after 180 s idle, and give
/// in-flight sessions 30 s to finish at shutdown.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// OpenSSH private key to use as the host key. An ephemeral ed25519
    /// key is generated when unset.
    pub host_key_path: Option<PathBuf>,
    /// Maximum concurrent connections; beyond this, connections are
    /// rejected at auth time.
    pub max_sessions: usize,
    /// Idle time after which a session is disconnected.
    pub idle_timeout: Duration,
    /// How long shutdown waits for in-flight sessions before force-closing
    /// them.
    pub grace_period: Duration,
    /// Text rendered in every session's greeting box.
    pub greeting: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2222,
            host_key_path: None,
            max_sessions: 40,
            idle_timeout: Duration::from_secs(180),
            grace_period: Duration::from_secs(30),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

/// State shared between the accept loop and session handlers.
///
/// Holds connection accounting and the session registry. View state is
/// deliberately absent: pages live inside their handlers only.
pub(crate) struct SharedState {
    registry: Mutex<SessionRegistry>,
    connections: AtomicUsize,
    next_session_id: AtomicU64,
    max_sessions: usize,
    drain_notify: Notify,
}

impl SharedState {
    fn new(max_sessions: usize) -> Self {
        Self {
            registry: Mutex::new(SessionRegistry::new()),
            connections: AtomicUsize::new(0),
            next_session_id: AtomicU64::new(1),
            max_sessions,
            drain_notify: Notify::new(),
        }
    }

    /// Account for a new connection and allocate its session id.
    pub(crate) fn connection_opened(&self) -> u64 {
        self.connections.fetch_add(1, Ordering::SeqCst);
        self.next_session_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Account for a closed connection, waking the shutdown drain when the
    /// last one goes away.
    pub(crate) fn connection_closed(&self) {
        if self.connections.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drain_notify.notify_waiters();
        }
    }

    /// Whether the session cap is exceeded, counting the caller's own
    /// connection.
    pub(crate) fn at_capacity(&self) -> bool {
        self.connections.load(Ordering::SeqCst) > self.max_sessions
    }

    pub(crate) fn active_connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub(crate) fn register_screen(&self, session_id: u64, entry: SessionEntry) {
        if !self.lock_registry().register(session_id, entry) {
            tracing::warn!(session_id, "screen already registered for session");
        }
    }

    pub(crate) fn unregister_screen(&self, session_id: u64) {
        let _ = self.lock_registry().unregister(session_id);
    }

    /// Wait until every connection has closed.
    pub(crate) async fn drained(&self) {
        loop {
            let notified = self.drain_notify.notified();
            if self.active_connections() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Close every registered session channel. Returns how many were
    /// closed.
    pub(crate) async fn force_close_all(&self) -> usize {
        let entries = self.lock_registry().drain_all();
        let closed = entries.len();
        for (session_id, entry) in entries {
            if entry.handle.close(entry.channel).await.is_err() {
                tracing::debug!(session_id, "session already gone during forced close");
            }
        }
        closed
    }

    fn lock_registry(&self) -> MutexGuard<'_, SessionRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The Placard SSH server.
///
/// Owns the listener exclusively; it is bound once in [`Server::bind`] and
/// closed exactly once when [`Server::run`] returns.
pub struct Server {
    listener: TcpListener,
    ssh_config: Arc<russh::server::Config>,
    shared: Arc<SharedState>,
    config: ServerConfig,
}

impl Server {
    /// Bind the listener and prepare the SSH configuration.
    ///
    /// A bind failure (e.g. the port is already taken) is fatal: it is
    /// returned before any session can exist.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let key = host_key(config.host_key_path.as_deref())?;

        let listener =
            TcpListener::bind((config.host.as_str(), config.port)).await.map_err(|e| {
                ServerError::Transport(format!(
                    "failed to bind {}:{}: {e}",
                    config.host, config.port
                ))
            })?;

        let ssh_config = Arc::new(russh::server::Config {
            auth_rejection_time: Duration::from_millis(200),
            auth_rejection_time_initial: Some(Duration::from_millis(50)),
            inactivity_timeout: Some(config.idle_timeout),
            keys: vec![key],
            ..Default::default()
        });

        let shared = Arc::new(SharedState::new(config.max_sessions));

        Ok(Self { listener, ssh_config, shared, config })
    }

    /// Local address the listener is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of currently open connections.
    pub fn active_sessions(&self) -> usize {
        self.shared.active_connections()
    }

    /// Run until SIGINT or SIGTERM, then shut down gracefully.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the accept loop until `shutdown` completes, then stop accepting
    /// and drain in-flight sessions within the grace period. Sessions still
    /// running at the deadline are force-closed; failures during shutdown
    /// are logged, never returned.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: std::future::Future<Output = ()>,
    {
        let Self { listener, ssh_config, shared, config } = self;
        let mut factory = GreeterFactory::new(Arc::clone(&shared), config.greeting.clone());

        let signalled = {
            let serve = factory.run_on_socket(ssh_config, &listener);
            tokio::pin!(serve);
            tokio::select! {
                res = &mut serve => {
                    res.map_err(|e| ServerError::Transport(format!("accept loop failed: {e}")))?;
                    tracing::warn!("listener closed without a shutdown signal");
                    false
                },
                () = shutdown => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    true
                },
            }
        };

        drop(listener);

        if !signalled {
            return Ok(());
        }

        match tokio::time::timeout(config.grace_period, shared.drained()).await {
            Ok(()) => tracing::info!("all sessions finished"),
            Err(_) => {
                let closed = shared.force_close_all().await;
                tracing::warn!(
                    closed,
                    grace_secs = config.grace_period.as_secs(),
                    "grace period expired, force-closed remaining sessions"
                );
            },
        }

        Ok(())
    }
}

/// Load the configured host key, or generate an ephemeral ed25519 key.
fn host_key(path: Option<&Path>) -> Result<russh::keys::PrivateKey, ServerError> {
    match path {
        Some(path) => russh::keys::load_secret_key(path, None).map_err(|e| {
            ServerError::Config(format!("failed to load host key '{}': {e}", path.display()))
        }),
        None => {
            tracing::warn!("no host key configured, generating an ephemeral ed25519 key");
            russh::keys::PrivateKey::random(&mut OsRng, russh::keys::Algorithm::Ed25519)
                .map_err(|e| ServerError::Config(format!("failed to generate host key: {e}")))
        },
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            },
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            },
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn test_config(grace: Duration) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            grace_period: grace,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn shutdown_with_no_sessions_returns_immediately() {
        let server = Server::bind(test_config(Duration::from_secs(30))).await.unwrap();
        let start = Instant::now();
        server.run_until(std::future::ready(())).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn shutdown_bounds_stragglers_to_grace_period() {
        let server = Server::bind(test_config(Duration::from_millis(200))).await.unwrap();
        let shared = Arc::clone(&server.shared);

        // A connection that never finishes on its own.
        let _id = shared.connection_opened();

        let start = Instant::now();
        server.run_until(std::future::ready(())).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(200), "shutdown returned before the grace period");
        assert!(elapsed < Duration::from_secs(5), "shutdown did not bound stragglers");
    }

    #[tokio::test]
    async fn drain_completes_when_last_connection_closes() {
        let shared = Arc::new(SharedState::new(40));
        let _a = shared.connection_opened();
        let _b = shared.connection_opened();

        let closer = Arc::clone(&shared);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            closer.connection_closed();
            closer.connection_closed();
        });

        tokio::time::timeout(Duration::from_secs(1), shared.drained())
            .await
            .unwrap_or_else(|_| panic!("drain did not complete after connections closed"));
    }

    #[tokio::test]
    async fn capacity_counts_live_connections() {
        let shared = SharedState::new(2);

        let _ = shared.connection_opened();
        assert!(!shared.at_capacity());
        let _ = shared.connection_opened();
        assert!(!shared.at_capacity());

        // The connection over the cap sees itself counted and is rejected.
        let _ = shared.connection_opened();
        assert!(shared.at_capacity());

        shared.connection_closed();
        assert!(!shared.at_capacity());
    }

    #[tokio::test]
    async fn session_ids_are_never_reused() {
        let shared = SharedState::new(40);
        let a = shared.connection_opened();
        shared.connection_closed();
        let b = shared.connection_opened();
        assert_ne!(a, b);
    }
}
