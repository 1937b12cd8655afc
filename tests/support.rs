//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use domoctl::{Config, DomoClient, SessionStore, TokenStore};

/// A client wired to a mock server with isolated on-disk state.
pub struct TestClient {
    pub client: DomoClient,
    pub tokens: Arc<TokenStore>,
    pub session: Arc<SessionStore>,
    pub state_dir: TempDir,
}

/// Some sandboxes forbid binding TCP ports; skip network tests there.
pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        api_url: Some(base_url.to_string()),
        ..Config::default()
    }
}

/// Builds a client against `base_url` with stores in a fresh temp directory.
pub fn test_client(base_url: &str) -> TestClient {
    let state_dir = TempDir::new().expect("create temp state dir");
    let tokens = Arc::new(TokenStore::open(state_dir.path()));
    let session = Arc::new(SessionStore::open(state_dir.path()));
    let client = DomoClient::with_stores(
        &test_config(base_url),
        Arc::clone(&tokens),
        Arc::clone(&session),
    )
    .expect("build client");
    TestClient {
        client,
        tokens,
        session,
        state_dir,
    }
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh })
}

pub fn user_body(login: &str) -> Value {
    json!({
        "id": 1,
        "login": login,
        "is_admin": false,
        "is_active": true,
        "has_pending_application": false,
        "application_submitted": true,
        "created_at": "2025-01-10T09:00:00Z"
    })
}

pub fn detail_body(detail: &str) -> Value {
    json!({ "detail": detail })
}

/// Mounts a happy-path `GET /auth/me` for `login` on any bearer.
pub async fn mount_me(server: &MockServer, login: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(login)))
        .mount(server)
        .await;
}
