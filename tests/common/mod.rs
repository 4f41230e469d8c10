#![allow(dead_code)]

use axum_test::TestServer;
use codelink::application::services::AllocationPolicy;
use codelink::infrastructure::cache::NullCache;
use codelink::infrastructure::persistence::{MemoryRecordRepository, MemoryUserRepository};
use codelink::routes::router;
use codelink::state::{AppState, StateOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &str = "test-signing-secret-0123456789abcdef";
pub const BASE_URL: &str = "http://s.example.com";

pub fn test_options() -> StateOptions {
    StateOptions {
        base_url: BASE_URL.to_string(),
        session_signing_secret: TEST_SECRET.to_string(),
        session_ttl: Duration::from_secs(3600),
        cookie_secure: false,
        code_length: 4,
        policy: AllocationPolicy::default(),
    }
}

/// State over fresh in-memory stores.
pub fn create_test_state(options: StateOptions) -> AppState {
    AppState::new(
        Arc::new(MemoryRecordRepository::new()),
        Arc::new(MemoryUserRepository::new()),
        Arc::new(NullCache::new()),
        options,
    )
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).unwrap()
}

/// Extracts the `name=value` pair of the first `Set-Cookie` header.
pub fn cookie_pair(response: &axum_test::TestResponse) -> String {
    let set_cookie = response.header("set-cookie");
    let set_cookie = set_cookie.to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Registers a user and returns their session cookie.
pub async fn register(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post("/api/register")
        .json(&json!({ "email": email, "password": password }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    cookie_pair(&response)
}
