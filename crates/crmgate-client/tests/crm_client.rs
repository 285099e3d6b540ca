use crmgate_client::{BackendFactory, ClientError, CrmBackend, HttpBackendFactory};
use crmgate_core::{Arguments, Credential, ErrorKind, GatewayError, ResponseFormat};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn factory(server: &MockServer, timeout: Duration) -> HttpBackendFactory {
    HttpBackendFactory::from_base_url(&server.base_url(), timeout).unwrap()
}

fn credential(token: &str) -> Credential {
    Credential::new(token).unwrap()
}

#[tokio::test]
async fn natural_query_posts_query_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/entity/natural_query")
                .header("authorization", "Bearer tenant-a-token")
                .json_body(json!({"query": "Show me leads", "response_format": "table"}));
            then.status(200).json_body(json!({"natural_response": "3 leads", "data": []}));
        })
        .await;

    let backend = factory(&server, Duration::from_secs(5)).bind(credential("tenant-a-token")).unwrap();
    let body = backend.natural_query("Show me leads", ResponseFormat::Table).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body["natural_response"], "3 leads");
}

#[tokio::test]
async fn call_tool_posts_name_and_arguments() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/entity/data")
                .header("authorization", "Bearer tok")
                .json_body(json!({"tool_name": "get_leads", "arguments": {"limit": 5}}));
            then.status(200).json_body(json!({"result": "ok"}));
        })
        .await;

    let mut args = Arguments::new();
    args.insert("limit".into(), json!(5));
    let backend = factory(&server, Duration::from_secs(5)).bind(credential("tok")).unwrap();
    let body = backend.call_tool("get_leads", &args).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body, json!({"result": "ok"}));
}

#[tokio::test]
async fn http_statuses_map_to_gateway_errors() {
    let cases = [
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Unauthorized),
        (400, ErrorKind::InvalidArgument),
        (404, ErrorKind::InvalidArgument),
        (500, ErrorKind::BackendError),
        (502, ErrorKind::BackendError),
    ];

    for (status, expected) in cases {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/entity/natural_query");
                then.status(status).json_body(json!({"error": format!("status {}", status)}));
            })
            .await;

        let backend = factory(&server, Duration::from_secs(5)).bind(credential("tok")).unwrap();
        let err = backend.natural_query("q", ResponseFormat::Both).await.unwrap_err();
        let gateway: GatewayError = err.into();
        assert_eq!(gateway.kind(), expected, "status {}", status);
    }
}

#[tokio::test]
async fn backend_message_is_kept_but_token_is_scrubbed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/entity/natural_query");
            then.status(401).json_body(json!({"message": "token secret-123 expired"}));
        })
        .await;

    let backend = factory(&server, Duration::from_secs(5)).bind(credential("secret-123")).unwrap();
    let err = backend.natural_query("q", ResponseFormat::Both).await.unwrap_err();
    match err {
        ClientError::Unauthorized { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("expired"));
            assert!(!message.contains("secret-123"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_internal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/entity/data");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let backend = factory(&server, Duration::from_secs(5)).bind(credential("tok")).unwrap();
    let err = backend.call_tool("get_leads", &Arguments::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
    assert_eq!(GatewayError::from(err).kind(), ErrorKind::InternalError);
}

#[tokio::test]
async fn slow_backend_times_out_as_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/entity/natural_query");
            then.status(200).delay(Duration::from_millis(800)).json_body(json!({}));
        })
        .await;

    let backend = factory(&server, Duration::from_millis(100)).bind(credential("tok")).unwrap();
    let err = backend.natural_query("q", ResponseFormat::Both).await.unwrap_err();
    assert_eq!(GatewayError::from(err).kind(), ErrorKind::BackendUnavailable);
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    let factory = HttpBackendFactory::from_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let err = factory.bind(credential("tok")).unwrap().natural_query("q", ResponseFormat::Both).await.unwrap_err();
    assert_eq!(GatewayError::from(err).kind(), ErrorKind::BackendUnavailable);
}

#[tokio::test]
async fn each_client_carries_only_its_own_credential() {
    let factory = HttpBackendFactory::from_base_url("https://crm.example.com", Duration::from_secs(5)).unwrap();
    let a = factory.client_for(credential("token-a")).unwrap();
    let b = factory.client_for(credential("token-b")).unwrap();
    assert_eq!(a.credential().expose(), "token-a");
    assert_eq!(b.credential().expose(), "token-b");
}
