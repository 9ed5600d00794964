//! GraphApi::get_user against a stub Graph service

use std::error::Error as _;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use msgraph::{Endpoints, GraphApi, GraphError, Nullable};

use crate::common;

#[tokio::test]
async fn test_get_user_decodes_profile() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    common::mount_user(&server, "jane@contoso.com", common::jane(), 1).await;
    let api = common::configured_api(&server);

    let user = api
        .get_user("jane@contoso.com", &[])
        .await
        .expect("get_user failed");

    assert_eq!(user.display_name, Nullable::Value("Jane Doe".to_string()));
    assert_eq!(user.id.as_option().map(String::as_str), Some("user-test-001"));
    assert_eq!(user.account_enabled, Nullable::Value(true));
    assert!(user.birthday.is_absent());
}

#[tokio::test]
async fn test_get_user_without_properties_sends_no_query() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/user-test-001", common::TENANT)))
        .and(|request: &Request| request.url.query().is_none())
        .respond_with(ResponseTemplate::new(200).set_body_json(common::jane()))
        .expect(1)
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    api.get_user("user-test-001", &[]).await.expect("get_user failed");
}

#[tokio::test]
async fn test_get_user_with_properties_sends_select() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/jane@contoso.com", common::TENANT)))
        .and(query_param("$select", "displayName,birthday"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "displayName": "Jane Doe",
            "birthday": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    let user = api
        .get_user("jane@contoso.com", &["displayName", "birthday"])
        .await
        .expect("get_user failed");

    assert!(user.display_name.is_value());
    assert!(user.birthday.is_null());
    assert!(user.mail.is_absent());
}

#[tokio::test]
async fn test_repeated_calls_reuse_token_and_client() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    common::mount_user(&server, "jane@contoso.com", common::jane(), 3).await;
    let api = common::configured_api(&server);

    for _ in 0..3 {
        api.get_user("jane@contoso.com", &[]).await.expect("get_user failed");
    }
}

#[tokio::test]
async fn test_missing_user_is_a_transport_error_with_body() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/nobody", common::TENANT)))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {
                "code": "Request_ResourceNotFound",
                "message": "Resource 'nobody' does not exist."
            }
        })))
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    let err = api.get_user("nobody", &[]).await.unwrap_err();
    assert!(matches!(err, GraphError::Transport { source: None, .. }));
    let message = err.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("Request_ResourceNotFound"));
}

#[tokio::test]
async fn test_malformed_body_is_a_decoding_error() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/jane@contoso.com", common::TENANT)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    let err = api.get_user("jane@contoso.com", &[]).await.unwrap_err();
    assert!(matches!(err, GraphError::Decoding(_)));
}

#[tokio::test]
async fn test_unreachable_graph_is_a_transport_error() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;

    let mut api = GraphApi::with_endpoints(
        common::TENANT,
        Endpoints::new(server.uri(), "http://127.0.0.1:1"),
    );
    api.set_client_id(common::CLIENT_ID);
    api.set_client_secret(common::CLIENT_SECRET);

    let err = api.get_user("jane@contoso.com", &[]).await.unwrap_err();
    assert!(matches!(err, GraphError::Transport { .. }));
    assert!(err.source().is_some());
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 0).await;
    common::mount_user(&server, "jane@contoso.com", common::jane(), 0).await;

    let api = GraphApi::with_endpoints(common::TENANT, Endpoints::new(server.uri(), server.uri()));

    let err = api.get_user("jane@contoso.com", &[]).await.unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

#[tokio::test]
async fn test_non_object_body_is_a_decoding_error() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/jane@contoso.com", common::TENANT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    let err = api.get_user("jane@contoso.com", &[]).await.unwrap_err();
    assert!(matches!(err, GraphError::Decoding(_)));
}

#[tokio::test]
async fn test_empty_id_never_reaches_the_collection() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 0).await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/v1.0/users/", common::TENANT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "1"}]
        })))
        .expect(0)
        .mount(&server)
        .await;
    let api = common::configured_api(&server);

    let err = api.get_user("", &[]).await.unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}
