//! HTTP client for `POST /api/ai`.

use derive_getters::Getters;
use futures_util::{Stream, StreamExt};
use medestudia_core::{
    CompletionRequest, CompletionResult, StatusTracker, StreamChunk, StreamEvent,
};
use medestudia_error::{ClientError, ClientErrorKind};
use medestudia_models::{SseLineBuffer, sse_data};
use reqwest::{Client, header};
use std::pin::Pin;
use tracing::{debug, instrument, warn};

/// Chat fragments read from the proxy's event stream.
pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<StreamChunk, ClientError>> + Send + 'a>>;

/// Client for the completion proxy.
#[derive(Debug, Clone, Getters)]
pub struct ProxyClient {
    /// HTTP client
    #[getter(skip)]
    client: Client,
    /// Proxy base URL, without the `/api/ai` path
    base_url: String,
}

impl ProxyClient {
    /// Creates a client for the proxy at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().build().map_err(|e| {
            ClientError::new(ClientErrorKind::Http(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn endpoint(&self, no_stream: bool) -> String {
        if no_stream {
            format!("{}/api/ai?noStream=1", self.base_url)
        } else {
            format!("{}/api/ai", self.base_url)
        }
    }

    /// Requests a buffered result.
    ///
    /// Non-success statuses and error-typed bodies become `Err` and count as
    /// a failure on `tracker`; anything else counts as a success.
    #[instrument(skip_all, fields(tool = %request.tool(), mode = %request.mode()))]
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        tracker: &StatusTracker,
    ) -> Result<CompletionResult, ClientError> {
        let result = self.fetch(request).await;
        tracker.record(result.is_ok());
        if let Err(e) = &result {
            warn!(error = %e, status = %tracker.current(), "Completion failed");
        }
        result
    }

    async fn fetch(&self, request: &CompletionRequest) -> Result<CompletionResult, ClientError> {
        let response = self
            .client
            .post(self.endpoint(true))
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::new(ClientErrorKind::Http(e.to_string())))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::new(ClientErrorKind::Http(e.to_string())))?;
        debug!(status = status.as_u16(), bytes = text.len(), "Proxy answered");

        if !status.is_success() {
            let message = match serde_json::from_str::<CompletionResult>(&text) {
                Ok(CompletionResult::Error(e)) if !e.error.is_empty() => e.error,
                _ => status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            };
            return Err(ClientError::new(ClientErrorKind::Status {
                status: status.as_u16(),
                message,
            }));
        }

        decode_result(&text)
    }

    /// Streams a chat answer.
    ///
    /// The returned stream yields fragments until the terminal sentinel. An
    /// error event, a read failure or a stream that stops without the
    /// sentinel ends it with one `Err`. `tracker` is updated once, when the
    /// stream finishes either way.
    #[instrument(skip_all, fields(mode = %request.mode()))]
    pub async fn stream_chat<'a>(
        &self,
        request: &CompletionRequest,
        tracker: &'a StatusTracker,
    ) -> Result<ChunkStream<'a>, ClientError> {
        let response = match self.client.post(self.endpoint(false)).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracker.record(false);
                return Err(ClientError::new(ClientErrorKind::Http(e.to_string())));
            }
        };

        let status = response.status();
        let is_event_stream = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"));

        if !status.is_success() || !is_event_stream {
            // Buffered answer: an error, or a mode the proxy does not stream.
            let text = response.text().await.unwrap_or_default();
            let outcome = if status.is_success() {
                decode_result(&text).and_then(|result| match result {
                    CompletionResult::Chat(chat) => Ok(StreamChunk {
                        content: chat.answer,
                    }),
                    other => Err(ClientError::new(ClientErrorKind::Decode(format!(
                        "expected a chat answer, got {:?}",
                        other.tool()
                    )))),
                })
            } else {
                let message = match serde_json::from_str::<CompletionResult>(&text) {
                    Ok(CompletionResult::Error(e)) => e.error,
                    _ => status.canonical_reason().unwrap_or("Unknown Status").to_string(),
                };
                Err(ClientError::new(ClientErrorKind::Status {
                    status: status.as_u16(),
                    message,
                }))
            };
            tracker.record(outcome.is_ok());
            return match outcome {
                Ok(chunk) => Ok(Box::pin(futures_util::stream::once(async move { Ok(chunk) }))),
                Err(e) => Err(e),
            };
        }

        let stream = async_stream::stream! {
            let mut body = response.bytes_stream();
            let mut lines = SseLineBuffer::default();
            let mut pending: Vec<String> = Vec::new();
            loop {
                if pending.is_empty() {
                    match body.next().await {
                        Some(Ok(bytes)) => pending = lines.push(&bytes),
                        Some(Err(e)) => {
                            tracker.record(false);
                            yield Err(ClientError::new(ClientErrorKind::Http(e.to_string())));
                            return;
                        }
                        None => match lines.finish() {
                            Some(line) => pending.push(line),
                            None => break,
                        },
                    }
                    continue;
                }

                let line = pending.remove(0);
                let Some(event) = sse_data(&line).and_then(StreamEvent::from_data) else {
                    continue;
                };
                match event {
                    StreamEvent::Content(chunk) => yield Ok(chunk),
                    StreamEvent::Done => {
                        tracker.record(true);
                        return;
                    }
                    StreamEvent::Error(message) => {
                        tracker.record(false);
                        yield Err(ClientError::new(ClientErrorKind::Stream(message)));
                        return;
                    }
                }
            }
            tracker.record(false);
            yield Err(ClientError::new(ClientErrorKind::Stream(
                "stream ended before completion".to_string(),
            )));
        };

        Ok(Box::pin(stream))
    }
}

fn decode_result(text: &str) -> Result<CompletionResult, ClientError> {
    let result: CompletionResult = serde_json::from_str(text)
        .map_err(|e| ClientError::new(ClientErrorKind::Decode(e.to_string())))?;
    match result {
        CompletionResult::Error(e) => Err(ClientError::new(ClientErrorKind::Service {
            message: e.error,
            raw: e.raw,
        })),
        result => Ok(result),
    }
}
