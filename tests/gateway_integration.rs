//! Completion gateway integration tests
//!
//! Runs `OpenAiGateway` against a `wiremock` server and checks the request it
//! sends and how each kind of answer (or non-answer) is classified.

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parley::config::GatewayConfig;
use parley::error::ParleyError;
use parley::providers::{CompletionGateway, OpenAiGateway};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn make_gateway(server: &MockServer, api_key: Option<&str>) -> OpenAiGateway {
    let config = GatewayConfig {
        endpoint: format!("{}{}", server.uri(), COMPLETIONS_PATH),
        model: "gpt-3.5-turbo".to_string(),
        api_key: api_key.map(str::to_string),
        max_tokens: 500,
        timeout_seconds: 5,
    };
    OpenAiGateway::new(config).expect("gateway should build")
}

fn error_kind(err: &anyhow::Error) -> &ParleyError {
    err.downcast_ref::<ParleyError>()
        .unwrap_or_else(|| panic!("expected ParleyError, got {}", err))
}

#[tokio::test]
async fn test_success_sends_expected_request_and_trims_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "Hello"}],
            "max_tokens": 500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "  Hi there!\n"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, Some("sk-test"));
    let reply = gateway.complete("Hello").await.expect("complete");
    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, None);
    let err = gateway.complete("Hello").await.unwrap_err();
    assert!(matches!(error_kind(&err), ParleyError::Configuration(_)));
}

#[tokio::test]
async fn test_server_error_is_upstream_with_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, Some("sk-test"));
    let err = gateway.complete("Hello").await.unwrap_err();
    match error_kind(&err) {
        ParleyError::Upstream(msg) => {
            assert!(msg.contains("500"), "message: {}", msg);
            assert!(msg.contains("model overloaded"), "message: {}", msg);
        }
        other => panic!("expected Upstream, got {}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, Some("sk-wrong"));
    let err = gateway.complete("Hello").await.unwrap_err();
    assert!(matches!(error_kind(&err), ParleyError::Upstream(_)));
}

#[tokio::test]
async fn test_missing_content_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"index": 0, "message": {"role": "assistant"}}]
        })))
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, Some("sk-test"));
    let err = gateway.complete("Hello").await.unwrap_err();
    assert!(matches!(error_kind(&err), ParleyError::Upstream(_)));
}

#[tokio::test]
async fn test_non_json_body_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, Some("sk-test"));
    let err = gateway.complete("Hello").await.unwrap_err();
    assert!(matches!(error_kind(&err), ParleyError::Upstream(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    // Bind then drop a listener so the port is known to be closed
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}", listener.local_addr().expect("local addr"))
    };

    let gateway = OpenAiGateway::new(GatewayConfig {
        endpoint: format!("{}{}", uri, COMPLETIONS_PATH),
        api_key: Some("sk-test".to_string()),
        timeout_seconds: 2,
        ..GatewayConfig::default()
    })
    .expect("gateway should build");

    let err = gateway.complete("Hello").await.unwrap_err();
    assert!(matches!(error_kind(&err), ParleyError::Network(_)));
}

#[tokio::test]
async fn test_single_attempt_no_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = make_gateway(&server, Some("sk-test"));
    assert!(gateway.complete("Hello").await.is_err());
}
