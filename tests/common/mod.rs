//! Common test utilities: the service spawned on a random port, plus a stub
//! upstream completion endpoint that records the requests it receives.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use answer_service::config::{AnswerConfig, ServerConfig, UpstreamConfig};
use answer_service::startup::Application;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const TEST_MODEL: &str = "gpt-3.5-turbo-0125";
pub const TEST_SYSTEM_PROMPT: &str = "你是一个通用的AI助手。";

/// One request captured by the stub upstream.
#[derive(Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// A stub completion endpoint plus the requests it has seen.
pub struct StubUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubUpstream {
    pub fn received(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Spawn an upstream that answers every completion call with `status` and
/// the JSON `body`.
pub async fn spawn_stub_upstream(status: StatusCode, body: Value) -> StubUpstream {
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let recorded = recorded.clone();
            let body = body.clone();
            async move {
                recorded.lock().unwrap().push(record(&headers, request));
                (status, Json(body))
            }
        }),
    );

    StubUpstream {
        url: serve_stub(app).await,
        requests,
    }
}

/// Spawn an upstream that answers every completion call with `status` and a
/// plain-text `body`, for replies that are not JSON at all.
pub async fn spawn_raw_stub_upstream(status: StatusCode, body: &'static str) -> StubUpstream {
    let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().unwrap().push(record(&headers, request));
                (status, body)
            }
        }),
    );

    StubUpstream {
        url: serve_stub(app).await,
        requests,
    }
}

fn record(headers: &HeaderMap, body: Value) -> RecordedRequest {
    RecordedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body,
    }
}

async fn serve_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("Failed to bind stub upstream");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Stub upstream crashed");
    });

    format!("http://{}/v1/chat/completions", addr)
}

/// Configuration pointing at the given upstream, listening on a random port.
pub fn test_config(upstream_url: &str) -> AnswerConfig {
    AnswerConfig {
        server: ServerConfig { port: 0 },
        upstream: UpstreamConfig {
            api_key: Secret::new("sk-test".to_string()),
            base_url: upstream_url.to_string(),
            model: TEST_MODEL.to_string(),
            system_prompt: TEST_SYSTEM_PROMPT.to_string(),
        },
    }
}

/// Spawn the service against the given upstream URL and return its base URL.
pub async fn spawn_app(upstream_url: &str) -> String {
    let app = Application::build(test_config(upstream_url))
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    format!("http://127.0.0.1:{}", port)
}

/// A well-formed completion envelope whose `content` is the JSON encoding of
/// `inner`.
pub fn envelope_with_content(inner: &Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "model": TEST_MODEL,
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": inner.to_string() },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 21, "completion_tokens": 17, "total_tokens": 38 }
    })
}

/// Assert the four permissive CORS headers are present with their fixed
/// values.
pub fn assert_cors_headers(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, OPTIONS, PUT, DELETE"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization, X-Requested-With"
    );
    assert_eq!(headers["access-control-max-age"], "86400");
}
