//! tests/common/mod.rs
//! Shared helpers to spawn the app on an ephemeral port with a given configuration.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{serve, Router};
use product_lookup_service::{create_app, AppState, EnvironmentVariables};
use tokio::net::TcpListener as TokioTcpListener;

/// Password used by every test profile; responses must never echo it.
pub const TEST_PASSWORD: &str = "s3cret-test-password";

/// Single-profile config whose database port refuses connections.
pub fn single_profile_env() -> Vec<(&'static str, String)> {
    vec![
        ("DB_USER", "reader".to_string()),
        ("DB_PASSWORD", TEST_PASSWORD.to_string()),
        ("DB_NAME", "store".to_string()),
        ("DB_PORT", "1".to_string()),
        ("DB_CONNECT_TIMEOUT_SECONDS", "2".to_string()),
        ("DB_QUERY_TIMEOUT_SECONDS", "2".to_string()),
        ("DEFAULT_TIMEOUT_SECONDS", "10".to_string()),
    ]
}

/// Multi-profile config with db1 and db2 configured, both pointing at a refused port.
pub fn multi_profile_env() -> Vec<(&'static str, String)> {
    vec![
        ("PROFILE_MODE", "multi".to_string()),
        ("DB1_USER", "reader_one".to_string()),
        ("DB1_PASSWORD", TEST_PASSWORD.to_string()),
        ("DB1_NAME", "store_one".to_string()),
        ("DB1_PORT", "1".to_string()),
        ("DB2_USER", "reader_two".to_string()),
        ("DB2_PASSWORD", TEST_PASSWORD.to_string()),
        ("DB2_NAME", "store_two".to_string()),
        ("DB2_PORT", "1".to_string()),
        ("DB_CONNECT_TIMEOUT_SECONDS", "2".to_string()),
        ("DB_QUERY_TIMEOUT_SECONDS", "2".to_string()),
        ("DEFAULT_TIMEOUT_SECONDS", "10".to_string()),
    ]
}

pub fn build_env(pairs: Vec<(&'static str, String)>) -> EnvironmentVariables {
    let vars: HashMap<&str, String> = pairs.into_iter().collect();
    EnvironmentVariables::from_lookup(|key| vars.get(key).cloned())
        .expect("test configuration should be valid")
}

/// Spawns the app on a random unused port and returns its base URL.
pub fn spawn_app(env: EnvironmentVariables) -> String {
    let state: AppState = AppState::new(Arc::new(env));
    let app: Router = create_app(state);

    // * Bind an ephemeral port using std::net::TcpListener.
    let std_listener: std::net::TcpListener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    std_listener.set_nonblocking(true).unwrap();

    // * Convert std::net::TcpListener to tokio::net::TcpListener.
    let tokio_listener: TokioTcpListener = TokioTcpListener::from_std(std_listener)
        .expect("Failed to convert to tokio listener");

    let addr: std::net::SocketAddr = tokio_listener.local_addr().unwrap();

    // * Spawn the server in a background task.
    tokio::spawn(async move {
        serve(tokio_listener, app)
            .await
            .expect("Server failed");
    });

    // * Return the base URL, e.g. "http://127.0.0.1:12345".
    format!("http://{}", addr)
}

pub async fn get(url: String) -> reqwest::Response {
    reqwest::Client::new()
        .get(url)
        .send()
        .await
        .expect("Failed to execute request.")
}
