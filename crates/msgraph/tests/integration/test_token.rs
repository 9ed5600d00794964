//! Token acquisition against a stub identity platform

use std::error::Error as _;
use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use msgraph::GraphError;

use crate::common;

#[tokio::test]
async fn test_token_is_fetched_once_and_reused() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    let api = common::configured_api(&server);

    let first = api.get_token().await.expect("first get_token failed");
    let second = api.get_token().await.expect("second get_token failed");

    assert_eq!(first.secret(), common::ACCESS_TOKEN);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_token_exchange_sends_client_credentials() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    let api = common::configured_api(&server);

    api.get_token().await.expect("get_token failed");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains(&format!("client_secret={}", common::CLIENT_SECRET)));
    assert!(body.contains("resource="));
}

#[tokio::test]
async fn test_expired_token_is_fetched_again() {
    let server = MockServer::start().await;
    // Shorter than the expiry margin, so every cached token is already stale.
    common::mount_token(&server, 30, 2).await;
    let api = common::configured_api(&server);

    api.get_token().await.expect("first get_token failed");
    api.get_token().await.expect("second get_token failed");
}

#[tokio::test]
async fn test_concurrent_first_use_performs_one_exchange() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    let api = Arc::new(common::configured_api(&server));

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.get_token().await })
        })
        .collect();

    for task in tasks {
        let token = task.await.unwrap().expect("get_token failed");
        assert_eq!(token.secret(), common::ACCESS_TOKEN);
    }
}

#[tokio::test]
async fn test_missing_secret_fails_without_network() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 0).await;

    let mut api = msgraph::GraphApi::with_endpoints(
        common::TENANT,
        msgraph::Endpoints::new(server.uri(), server.uri()),
    );
    api.set_client_id(common::CLIENT_ID);

    let err = api.get_token().await.unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
    assert!(err.to_string().contains("Client secret"));
}

#[tokio::test]
async fn test_rejected_credentials_are_a_token_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/token", common::TENANT)))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "Invalid client secret provided."
        })))
        .expect(1)
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    let err = api.get_token().await.unwrap_err();
    assert!(matches!(err, GraphError::Token { .. }));
    assert!(err.to_string().contains("invalid_client"));
    assert!(err.source().is_some());
}

#[tokio::test]
async fn test_unreachable_token_endpoint_is_a_token_error() {
    let mut api = msgraph::GraphApi::with_endpoints(
        common::TENANT,
        msgraph::Endpoints::new("http://127.0.0.1:1", "http://127.0.0.1:1"),
    );
    api.set_client_id(common::CLIENT_ID);
    api.set_client_secret(common::CLIENT_SECRET);

    let err = api.get_token().await.unwrap_err();
    assert!(matches!(err, GraphError::Token { .. }));
    assert!(err.source().is_some());
}
