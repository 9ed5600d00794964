//! HTTP debug tracing through a real client

use wiremock::MockServer;

use msgraph::DebugSink;

use crate::common;

#[tokio::test]
async fn test_http_debug_traces_without_changing_results() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 2).await;
    common::mount_user(&server, "jane@contoso.com", common::jane(), 2).await;

    let plain = common::configured_api(&server);
    let expected = plain
        .get_user("jane@contoso.com", &[])
        .await
        .expect("plain get_user failed");

    let captured = common::Captured::default();
    let mut traced = common::configured_api(&server).with_debug_sink(DebugSink::new(captured.clone()));
    traced.set_http_debug(true);
    let actual = traced
        .get_user("jane@contoso.com", &[])
        .await
        .expect("traced get_user failed");

    assert_eq!(actual, expected);

    let out = captured.contents();
    assert!(out.contains(&format!("POST {}/{}/oauth2/token", server.uri(), common::TENANT)));
    assert!(out.contains("grant_type=client_credentials"));
    assert!(!out.contains(common::CLIENT_SECRET));
    assert!(out.contains(&format!("GET {}/{}/v1.0/users/jane@contoso.com", server.uri(), common::TENANT)));
    assert!(out.contains("authorization: [REDACTED]"));
    assert!(out.contains("\"displayName\":\"Jane Doe\""));
    assert_eq!(out.matches("[request]").count(), 2);
    assert_eq!(out.matches("[/response]").count(), 2);
}

#[tokio::test]
async fn test_http_debug_after_client_is_built_has_no_effect() {
    let server = MockServer::start().await;
    common::mount_token(&server, 3600, 1).await;
    common::mount_user(&server, "jane@contoso.com", common::jane(), 2).await;

    let captured = common::Captured::default();
    let mut api = common::configured_api(&server).with_debug_sink(DebugSink::new(captured.clone()));

    api.get_user("jane@contoso.com", &[]).await.expect("first get_user failed");
    api.set_http_debug(true);
    api.get_user("jane@contoso.com", &[]).await.expect("second get_user failed");

    assert!(captured.contents().is_empty());
}
