//! Client for the upstream OpenAI-compatible chat-completion endpoint.

use crate::openai_compat::{ChatChunk, ChatRequest, ChatResponse, conversions};
use crate::sse::{SseLineBuffer, sse_data};
use derive_getters::Getters;
use futures_util::{Stream, StreamExt};
use medestudia_core::{DONE_SENTINEL, GenerationParams, PromptPair};
use medestudia_error::{UpstreamError, UpstreamErrorKind};
use reqwest::{Client, StatusCode};
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Connection and timeout settings for the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct UpstreamSettings {
    /// Full chat-completions URL
    endpoint: String,
    /// API key sent in the `api-key` header
    #[builder(default, setter(into, strip_option))]
    api_key: Option<String>,
    /// Optional model name for endpoints that do not encode it in the URL
    #[builder(default, setter(into, strip_option))]
    model: Option<String>,
    /// TCP/TLS connect timeout
    #[builder(default = "Duration::from_secs(10)")]
    connect_timeout: Duration,
    /// Whole-request timeout for buffered calls
    #[builder(default = "Duration::from_secs(60)")]
    request_timeout: Duration,
    /// Longest silence tolerated between streamed reads
    #[builder(default = "Duration::from_secs(30)")]
    stream_idle_timeout: Duration,
}

impl UpstreamSettings {
    /// Returns a builder for constructing UpstreamSettings.
    pub fn builder() -> UpstreamSettingsBuilder {
        UpstreamSettingsBuilder::default()
    }
}

/// One decoded event of an upstream stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamDelta {
    /// Token fragment
    Text(String),
    /// Upstream finished, by sentinel or by closing the body
    Done,
}

/// Stream of decoded upstream events. Dropping it aborts the upstream read.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<UpstreamDelta, UpstreamError>> + Send>>;

/// Client for the upstream chat-completion API.
///
/// Holds no per-request state; clones share the connection pool only.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    settings: UpstreamSettings,
}

impl UpstreamClient {
    /// Creates a client from settings.
    #[instrument(skip(settings), fields(endpoint = %settings.endpoint))]
    pub fn new(settings: UpstreamSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| {
                UpstreamError::new(UpstreamErrorKind::Transport(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;
        debug!(
            has_key = settings.api_key.is_some(),
            model = ?settings.model,
            "Created upstream client"
        );
        Ok(Self { client, settings })
    }

    /// Settings this client was built with.
    pub fn settings(&self) -> &UpstreamSettings {
        &self.settings
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.settings.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Runs a buffered completion and returns the assistant text.
    ///
    /// # Errors
    ///
    /// Missing key, transport failure, non-2xx status, undecodable body, or
    /// an empty completion.
    #[instrument(skip_all, fields(max_tokens = *params.max_tokens(), json_mode = *params.json_mode()))]
    pub async fn complete(
        &self,
        prompts: &PromptPair,
        params: &GenerationParams,
    ) -> Result<String, UpstreamError> {
        let request =
            conversions::to_chat_request(prompts, params, self.settings.model.as_deref());
        let response = self.send(&request).await?;

        let body: ChatResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to read upstream response");
            if e.is_decode() {
                UpstreamError::new(UpstreamErrorKind::Decode(e.to_string()))
            } else {
                self.transport_error(&e, self.settings.request_timeout)
            }
        })?;

        let text = body.first_text();
        if text.is_empty() {
            warn!(choices = body.choices.len(), "Upstream returned an empty completion");
            return Err(UpstreamError::new(UpstreamErrorKind::EmptyCompletion));
        }
        debug!(chars = text.chars().count(), "Received completion");
        Ok(text.to_string())
    }

    /// Starts a streamed completion.
    ///
    /// Status errors are reported before any event is produced. Once the
    /// stream is running, a read error or an idle timeout yields one `Err`
    /// and ends it.
    #[instrument(skip_all, fields(max_tokens = *params.max_tokens()))]
    pub async fn stream(
        &self,
        prompts: &PromptPair,
        params: &GenerationParams,
    ) -> Result<DeltaStream, UpstreamError> {
        let request =
            conversions::to_chat_request(prompts, params, self.settings.model.as_deref());
        let response = self.send(&request).await?;
        let idle = self.settings.stream_idle_timeout;

        let stream = async_stream::stream! {
            let mut body = response.bytes_stream();
            let mut lines = SseLineBuffer::default();
            loop {
                let next = match tokio::time::timeout(idle, body.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(idle = ?idle, "Upstream stream went idle");
                        yield Err(UpstreamError::new(UpstreamErrorKind::StreamInterrupted(
                            format!("no data from AI service for {:?}", idle),
                        )));
                        return;
                    }
                };
                match next {
                    Some(Ok(bytes)) => {
                        for line in lines.push(&bytes) {
                            match parse_line(&line) {
                                Some(UpstreamDelta::Done) => {
                                    yield Ok(UpstreamDelta::Done);
                                    return;
                                }
                                Some(delta) => yield Ok(delta),
                                None => {}
                            }
                        }
                    }
                    Some(Err(e)) => {
                        error!(error = ?e, "Upstream stream read failed");
                        yield Err(UpstreamError::new(UpstreamErrorKind::StreamInterrupted(
                            e.to_string(),
                        )));
                        return;
                    }
                    None => break,
                }
            }

            if let Some(line) = lines.finish() {
                if let Some(UpstreamDelta::Text(text)) = parse_line(&line) {
                    yield Ok(UpstreamDelta::Text(text));
                }
            }
            debug!("Upstream closed the stream without a sentinel");
            yield Ok(UpstreamDelta::Done);
        };

        Ok(Box::pin(stream))
    }

    async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, UpstreamError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                error!("API key not configured");
                UpstreamError::new(UpstreamErrorKind::MissingApiKey)
            })?;

        debug!(
            messages = request.messages().len(),
            stream = request.is_streaming(),
            "Sending upstream request"
        );

        let builder = self
            .client
            .post(&self.settings.endpoint)
            .header("api-key", api_key)
            .json(request);

        let response = if request.is_streaming() {
            // Only the wait for response headers; body reads have their own idle bound.
            let limit = self.settings.stream_idle_timeout;
            match tokio::time::timeout(limit, builder.send()).await {
                Ok(sent) => sent.map_err(|e| self.transport_error(&e, limit))?,
                Err(_) => {
                    error!(limit = ?limit, "Upstream sent no response headers");
                    return Err(UpstreamError::new(UpstreamErrorKind::Transport(
                        timed_out_message(limit),
                    )));
                }
            }
        } else {
            let limit = self.settings.request_timeout;
            builder
                .timeout(limit)
                .send()
                .await
                .map_err(|e| self.transport_error(&e, limit))?
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = tokio::time::timeout(self.settings.request_timeout, response.text())
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default();
        error!(status = %status, error = %error_text, "Upstream API error");
        if status == StatusCode::UNAUTHORIZED {
            return Err(UpstreamError::new(UpstreamErrorKind::Unauthorized));
        }
        Err(UpstreamError::new(UpstreamErrorKind::status(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
            &error_text,
        )))
    }

    fn transport_error(&self, error: &reqwest::Error, limit: Duration) -> UpstreamError {
        error!(error = ?error, endpoint = %self.settings.endpoint, "HTTP request failed");
        let message = if error.is_timeout() {
            timed_out_message(limit)
        } else {
            format!("Failed to reach AI service: {}", error)
        };
        UpstreamError::new(UpstreamErrorKind::Transport(message))
    }
}

fn timed_out_message(limit: Duration) -> String {
    format!("AI service timed out after {:?}", limit)
}

/// Decodes one upstream SSE line; `None` for anything that carries no text.
fn parse_line(line: &str) -> Option<UpstreamDelta> {
    let data = sse_data(line)?.trim();
    if data == DONE_SENTINEL {
        return Some(UpstreamDelta::Done);
    }
    match serde_json::from_str::<ChatChunk>(data) {
        Ok(chunk) => chunk
            .delta_text()
            .map(|text| UpstreamDelta::Text(text.to_string())),
        Err(e) => {
            debug!(error = %e, "Skipping undecodable stream line");
            None
        }
    }
}
