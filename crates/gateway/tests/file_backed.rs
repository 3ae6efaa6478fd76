//! The bootstrapped app with JSONL history on disk.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use synapse_domain::config::{Config, HistoryBackend};
use synapse_gateway::{api, bootstrap};

fn app_with(provider: &str, base_url: String, history_dir: &Path) -> api::App {
    let mut config = Config::default();
    config.model.provider = provider.into();
    config.model.api_key = Some("AIzaSECRETKEY123".into());
    config.model.base_url = Some(base_url);
    config.history.backend = HistoryBackend::File;
    config.history.dir = history_dir.to_path_buf();
    api::app(bootstrap::build_app_state(Arc::new(config)).unwrap())
}

async fn invoke(app: &api::App, input: &str, session: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/invoke")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"input": input, "sessionId": session}).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn turns_land_on_disk_and_feed_the_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "noted"}}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = app_with("openai", server.uri(), dir.path());

    assert_eq!(invoke(&app, "my name is Ada", "disk-1").await.0, StatusCode::OK);
    let (status, body) = invoke(&app, "what is my name?", "disk-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "noted"}));

    let raw = std::fs::read_to_string(dir.path().join("disk-1.jsonl")).unwrap();
    let lines: Vec<Value> = raw
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let roles: Vec<_> = lines.iter().map(|l| l["role"].as_str().unwrap()).collect();
    assert_eq!(roles, ["human", "assistant", "human", "assistant"]);
    assert_eq!(lines[2]["content"], "what is my name?");

    let received = server.received_requests().await.unwrap();
    let second: Value = serde_json::from_slice(&received[1].body).unwrap();
    let sent = second["messages"].as_array().unwrap();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[1]["content"], "my name is Ada");
    assert_eq!(sent[2]["content"], "noted");
    assert_eq!(sent[3]["content"], "what is my name?");
}

#[tokio::test]
async fn unreachable_provider_error_hides_the_key() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let app = app_with("google", format!("http://127.0.0.1:{port}"), dir.path());

    let (status, body) = invoke(&app, "hello", "offline").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let msg = body["error"].as_str().unwrap();
    assert!(msg.starts_with("An error occurred. Details: "), "{msg}");
    assert!(!msg.contains("AIzaSECRETKEY123"), "{msg}");
    assert!(!dir.path().join("offline.jsonl").exists());
}
