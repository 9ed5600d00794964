//! Shared test helpers for the integration tests
//!
//! One wiremock server plays both hosts: the token endpoint lives at
//! `/{tenant}/oauth2/token` and Graph resources under `/{tenant}/v1.0/...`.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use msgraph::{Endpoints, GraphApi};

pub const TENANT: &str = "contoso.com";
pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const ACCESS_TOKEN: &str = "test-access-token";

/// Returns a client pointed at `server` with credentials set
pub fn configured_api(server: &MockServer) -> GraphApi {
    let mut api = GraphApi::with_endpoints(TENANT, Endpoints::new(server.uri(), server.uri()));
    api.set_client_id(CLIENT_ID);
    api.set_client_secret(CLIENT_SECRET);
    api
}

/// Mounts the token endpoint, expecting exactly `calls` exchanges
pub async fn mount_token(server: &MockServer, expires_in: u64, calls: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/token", TENANT)))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains(format!("client_id={}", CLIENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": expires_in
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Mounts `GET /{tenant}/v1.0/users/{id}` answering with `body`
pub async fn mount_user(server: &MockServer, id: &str, body: serde_json::Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/{}", TENANT, id)))
        .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

pub fn jane() -> serde_json::Value {
    serde_json::json!({
        "id": "user-test-001",
        "displayName": "Jane Doe",
        "mail": "jane@contoso.com",
        "userPrincipalName": "jane@contoso.com",
        "accountEnabled": true
    })
}

/// In-memory writer used as a debug sink
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
