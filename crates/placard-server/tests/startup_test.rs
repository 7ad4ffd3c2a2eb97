//! Startup scenarios for the session server.

use placard_server::{Server, ServerConfig, ServerError};

fn local_config(port: u16) -> ServerConfig {
    ServerConfig { host: "127.0.0.1".to_string(), port, ..ServerConfig::default() }
}

#[tokio::test]
async fn bind_conflict_is_fatal_before_any_session() {
    let occupied = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let err = match Server::bind(local_config(port)).await {
        Err(err) => err,
        Ok(_) => panic!("bind must fail while the port is taken"),
    };

    assert!(matches!(err, ServerError::Transport(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn binds_ephemeral_port_with_zero_sessions() {
    let server = Server::bind(local_config(0)).await.unwrap();

    let addr = server.local_addr().unwrap();
    assert_ne!(addr.port(), 0);
    assert_eq!(server.active_sessions(), 0);
}

#[tokio::test]
async fn missing_host_key_file_is_a_config_error() {
    let config = ServerConfig {
        host_key_path: Some("/nonexistent/host_key".into()),
        ..local_config(0)
    };

    let err = match Server::bind(config).await {
        Err(err) => err,
        Ok(_) => panic!("bind must fail with an unreadable host key"),
    };

    assert!(matches!(err, ServerError::Config(_)), "unexpected error: {err}");
}
