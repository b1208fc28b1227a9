//! Fake upstream chat-completion server and proxy helpers for integration tests.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use futures_util::StreamExt;
use medestudia_server::{ApiState, ProxyConfig, ProxyConfigBuilder, create_router};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// What the fake upstream answers to every call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with a chat completion whose content is the given text
    Completion(String),
    /// Given status with a plain-text body
    Status(StatusCode, String),
    /// 200 event stream with the given raw chunks
    Sse(Vec<&'static str>),
    /// Event stream that sends the chunks and then never ends
    SseThenStall(Vec<&'static str>),
    /// Accepts the request and never sends response headers
    Hang,
}

/// Records what the proxy sent upstream.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Value {
        self.bodies.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }

    pub fn user_prompt(&self) -> String {
        self.last_body()["messages"][1]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}

async fn upstream(
    State((recorder, reply)): State<(Recorder, Arc<Reply>)>,
    Json(body): Json<Value>,
) -> Response {
    recorder.calls.fetch_add(1, Ordering::SeqCst);
    recorder.bodies.lock().unwrap().push(body);
    match reply.as_ref() {
        Reply::Completion(text) => Json(json!({
            "id": "chatcmpl-test",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
        }))
        .into_response(),
        Reply::Status(status, text) => (*status, text.clone()).into_response(),
        Reply::Sse(chunks) => event_stream(chunks.clone(), false),
        Reply::SseThenStall(chunks) => event_stream(chunks.clone(), true),
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

fn event_stream(chunks: Vec<&'static str>, stall: bool) -> Response {
    let head = futures_util::stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c.as_bytes()))),
    );
    let body = if stall {
        Body::from_stream(head.chain(futures_util::stream::pending()))
    } else {
        Body::from_stream(head)
    };
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

/// Starts a fake upstream on an ephemeral port and returns its URL.
pub async fn spawn_upstream(reply: Reply) -> anyhow::Result<(String, Recorder)> {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/chat/completions", post(upstream))
        .with_state((recorder.clone(), Arc::new(reply)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{}/chat/completions", addr), recorder))
}

/// Proxy configuration pointed at `endpoint`, with a short stream idle timeout.
pub fn proxy_config(endpoint: &str, api_key: Option<&str>) -> ProxyConfigBuilder {
    let mut builder = ProxyConfig::builder();
    builder
        .endpoint(endpoint)
        .api_key(api_key.map(str::to_string))
        .stream_idle_timeout(Duration::from_millis(300));
    builder
}

/// Proxy router pointed at `endpoint`.
pub fn proxy(endpoint: &str, api_key: Option<&str>) -> anyhow::Result<Router> {
    router(&proxy_config(endpoint, api_key))
}

/// Proxy router built from `builder`.
pub fn router(builder: &ProxyConfigBuilder) -> anyhow::Result<Router> {
    Ok(create_router(ApiState::new(builder.build()?)?))
}

/// Sends a request through the router and returns status, headers and body text.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, axum::http::HeaderMap, String)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })?;
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, headers, String::from_utf8(bytes.to_vec())?))
}

/// Posts a completion request and decodes the JSON answer.
pub async fn post_json(router: &Router, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    let (status, _, text) = send(router, "POST", uri, Some(body)).await?;
    Ok((status, serde_json::from_str(&text)?))
}
