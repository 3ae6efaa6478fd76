//! Adapter wire behaviour against a mocked HTTP backend.

use serde_json::json;
use synapse_domain::config::ModelConfiguration;
use synapse_domain::error::Error;
use synapse_domain::message::Message;
use synapse_providers::{resolve, ChatModel, ChatRequest};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ChatRequest {
    ChatRequest::new(vec![
        Message::system("You are a helpful assistant."),
        Message::user("ping"),
    ])
}

#[tokio::test]
async fn openai_sends_bearer_and_parses_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "ping"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"message": {"role": "assistant", "content": "pong"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = ModelConfiguration {
        provider: "openai".into(),
        api_key: Some("sk-test".into()),
        base_url: Some(format!("{}/v1", server.uri())),
        ..Default::default()
    };
    let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
    let resp = model.chat(&request()).await.unwrap();

    assert_eq!(resp.content, "pong");
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
    assert_eq!(resp.usage.unwrap().total_tokens, 13);
}

#[tokio::test]
async fn openai_compatible_uses_placeholder_key_and_zero_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer EMPTY"))
        .and(body_partial_json(json!({"model": "granite", "temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = ModelConfiguration {
        provider: "openai-compatible".into(),
        name: "granite".into(),
        base_url: Some(server.uri()),
        ..Default::default()
    };
    let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(model.chat(&request()).await.unwrap().content, "ok");
}

#[tokio::test]
async fn google_sends_key_in_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
        .and(header("x-goog-api-key", "AIza-test"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "You are a helpful assistant."}]},
            "contents": [{"role": "user", "parts": [{"text": "ping"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "pong"}]}, "finishReason": "STOP"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = ModelConfiguration {
        provider: "google".into(),
        api_key: Some("AIza-test".into()),
        base_url: Some(server.uri()),
        ..Default::default()
    };
    let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(model.chat(&request()).await.unwrap().content, "pong");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].url.query().is_none());
}

/// A port nothing listens on: bind an ephemeral port, then release it.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn transport_error_never_carries_the_api_key() {
    let secret = "AIzaSECRETKEY123";
    for provider in ["google", "openai"] {
        let cfg = ModelConfiguration {
            provider: provider.into(),
            api_key: Some(secret.into()),
            base_url: Some(closed_port_url()),
            ..Default::default()
        };
        let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
        let err = model.chat(&request()).await.err().unwrap();

        assert!(matches!(err, Error::Http(_)), "{provider}: {err}");
        let text = format!("{err} {err:?}");
        assert!(!text.contains(secret), "{provider} leaked key: {text}");
        assert!(!text.contains("127.0.0.1"), "{provider} leaked url: {text}");
    }
}

#[tokio::test]
async fn ollama_posts_non_streaming_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "llama3", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": "pong"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = ModelConfiguration {
        provider: "ollama".into(),
        name: "llama3".into(),
        base_url: Some(server.uri()),
        ..Default::default()
    };
    let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(model.chat(&request()).await.unwrap().content, "pong");
}

#[tokio::test]
async fn non_success_status_is_provider_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let cfg = ModelConfiguration {
        provider: "mistral".into(),
        api_key: Some("bad".into()),
        base_url: Some(server.uri()),
        ..Default::default()
    };
    let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
    match model.chat(&request()).await {
        Err(Error::Provider { provider, message }) => {
            assert_eq!(provider, "mistral");
            assert!(message.contains("401"));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("expected provider error, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn malformed_body_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let cfg = ModelConfiguration {
        provider: "openai".into(),
        api_key: Some("k".into()),
        base_url: Some(server.uri()),
        ..Default::default()
    };
    let model = resolve(&cfg).unwrap_or_else(|e| panic!("{e}"));
    let err = model.chat(&request()).await.err().unwrap();
    assert!(err.to_string().contains("malformed response body"));
}
