//! End-to-end tests: proxy client -> proxy server -> fake upstream.

use axum::{
    Json, Router,
    body::{Body, Bytes},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use futures_util::StreamExt;
use medestudia_client::ProxyClient;
use medestudia_core::{
    AiStatus, CompletionRequest, CompletionResult, Language, MAX_INPUT_CHARS, Mode,
    StatusTracker, Tool,
};
use medestudia_error::ClientErrorKind;
use medestudia_server::{ApiState, ProxyConfig, create_router};
use serde_json::json;
use std::time::Duration;

async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

/// Starts a fake upstream answering with `handler` and a proxy in front of it.
async fn stack(upstream: Router, api_key: Option<&str>) -> anyhow::Result<ProxyClient> {
    let upstream_url = serve(upstream).await?;
    let config = ProxyConfig::builder()
        .endpoint(format!("{}/chat/completions", upstream_url))
        .api_key(api_key.map(str::to_string))
        .stream_idle_timeout(Duration::from_millis(300))
        .build()?;
    let proxy_url = serve(create_router(ApiState::new(config)?)).await?;
    Ok(ProxyClient::new(proxy_url)?)
}

fn completion(content: &'static str) -> Router {
    Router::new().route(
        "/chat/completions",
        post(move || async move {
            Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]}))
        }),
    )
}

fn event_stream(chunks: Vec<&'static str>) -> Router {
    Router::new().route(
        "/chat/completions",
        post(move || {
            let chunks = chunks.clone();
            async move {
                let body = Body::from_stream(futures_util::stream::iter(
                    chunks
                        .into_iter()
                        .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c.as_bytes()))),
                ));
                ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
            }
        }),
    )
}

fn request(tool: Tool, mode: Mode) -> CompletionRequest {
    CompletionRequest::new(tool, mode, Language::En, "asthma", None, MAX_INPUT_CHARS)
}

#[tokio::test]
async fn test_complete_explain_marks_online() -> anyhow::Result<()> {
    let client = stack(
        completion(r#"{"definition":"Asthma is a chronic inflammatory airway disease.","keyFeatures":["Wheeze","Reversible obstruction"]}"#),
        Some("secret"),
    )
    .await?;
    let tracker = StatusTracker::new(AiStatus::Limited);

    let result = client.complete(&request(Tool::Explain, Mode::Preclinical), &tracker).await?;
    match result {
        CompletionResult::Explain(explain) => {
            assert!(explain.definition.starts_with("Asthma"));
            assert_eq!(explain.key_features.len(), 2);
        }
        other => anyhow::bail!("unexpected result {:?}", other),
    }
    assert_eq!(tracker.current(), AiStatus::Online);
    Ok(())
}

#[tokio::test]
async fn test_soft_error_degrades_status() -> anyhow::Result<()> {
    let client = stack(completion("not json at all"), Some("secret")).await?;
    let tracker = StatusTracker::default();
    let req = request(Tool::Mcq, Mode::Preclinical);

    let err = client.complete(&req, &tracker).await.unwrap_err();
    assert!(matches!(
        &err.kind,
        ClientErrorKind::Service { message, raw: Some(raw) }
            if message == "Model returned non-JSON" && raw == "not json at all"
    ));
    assert_eq!(tracker.current(), AiStatus::Limited);

    client.complete(&req, &tracker).await.unwrap_err();
    assert_eq!(tracker.current(), AiStatus::Offline);
    Ok(())
}

#[tokio::test]
async fn test_missing_key_is_status_error() -> anyhow::Result<()> {
    let client = stack(completion("{}"), None).await?;
    let tracker = StatusTracker::default();

    let err = client
        .complete(&request(Tool::Quiz, Mode::Preclinical), &tracker)
        .await
        .unwrap_err();
    match err.kind {
        ClientErrorKind::Status { status, message } => {
            assert_eq!(status, 500);
            assert!(message.starts_with("AI service not configured"));
        }
        other => anyhow::bail!("unexpected error {:?}", other),
    }
    assert_eq!(tracker.current(), AiStatus::Limited);
    Ok(())
}

#[tokio::test]
async fn test_stream_chat_collects_fragments() -> anyhow::Result<()> {
    let client = stack(
        event_stream(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"Asthma \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"is chronic.\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]),
        Some("secret"),
    )
    .await?;
    let tracker = StatusTracker::new(AiStatus::Offline);

    let mut stream = client
        .stream_chat(&request(Tool::Chat, Mode::ClinicalStudy), &tracker)
        .await?;
    let mut answer = String::new();
    while let Some(chunk) = stream.next().await {
        answer.push_str(&chunk?.content);
    }
    drop(stream);
    assert_eq!(answer, "Asthma is chronic.");
    assert_eq!(tracker.current(), AiStatus::Online);
    Ok(())
}

#[tokio::test]
async fn test_stream_chat_upstream_rejection() -> anyhow::Result<()> {
    let upstream = Router::new().route(
        "/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "denied").into_response() }),
    );
    let client = stack(upstream, Some("stale")).await?;
    let tracker = StatusTracker::default();

    let err = match client
        .stream_chat(&request(Tool::Chat, Mode::Preclinical), &tracker)
        .await
    {
        Ok(_) => anyhow::bail!("expected an error"),
        Err(err) => err,
    };
    assert!(matches!(
        &err.kind,
        ClientErrorKind::Status { status: 500, message } if message.starts_with("Invalid API key")
    ));
    assert_eq!(tracker.current(), AiStatus::Limited);
    Ok(())
}

#[tokio::test]
async fn test_stream_chat_error_event_is_err() -> anyhow::Result<()> {
    let upstream = Router::new().route(
        "/chat/completions",
        post(|| async {
            let head = futures_util::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            ))]);
            let body = Body::from_stream(head.chain(futures_util::stream::pending()));
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        }),
    );
    let client = stack(upstream, Some("secret")).await?;
    let tracker = StatusTracker::default();

    let stream = client
        .stream_chat(&request(Tool::Chat, Mode::Preclinical), &tracker)
        .await?;
    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().map(|c| c.content.as_str()).ok(), Some("Hi"));
    assert!(matches!(
        items[1].as_ref().map_err(|e| &e.kind),
        Err(ClientErrorKind::Stream(_))
    ));
    assert_eq!(tracker.current(), AiStatus::Limited);
    Ok(())
}

#[tokio::test]
async fn test_guideline_chat_arrives_buffered() -> anyhow::Result<()> {
    let client = stack(
        completion(r#"{"answer":"Follow the stepwise asthma plan."}"#),
        Some("secret"),
    )
    .await?;
    let tracker = StatusTracker::default();

    let stream = client
        .stream_chat(&request(Tool::Chat, Mode::ClinicalGuidelines), &tracker)
        .await?;
    let chunks: Vec<_> = stream.collect().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(
        chunks[0].as_ref().map(|c| c.content.as_str()).ok(),
        Some("Follow the stepwise asthma plan.")
    );
    assert_eq!(tracker.current(), AiStatus::Online);
    Ok(())
}
