//! HTTP surface of the completion proxy.

use crate::config::ProxyConfig;
use crate::metrics::{Outcome, ProxyMetrics};
use crate::normalize::{chat_result, normalize_structured};
use crate::relay::sse_response;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use medestudia_core::{
    CompletionRequest, CompletionResult, GenerationParams, RawCompletionRequest, build_prompts,
};
use medestudia_error::{MedestudiaError, MedestudiaResult, RequestError, RequestErrorKind};
use medestudia_models::UpstreamClient;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Span, error, info, instrument, warn};

/// Path of the completion endpoint.
pub const COMPLETION_PATH: &str = "/api/ai";

/// Shared state of the proxy; holds nothing request-specific.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Upstream client
    pub upstream: Arc<UpstreamClient>,
    /// Proxy configuration
    pub config: Arc<ProxyConfig>,
    /// Request counters
    pub metrics: Arc<ProxyMetrics>,
}

impl ApiState {
    /// Builds the state, including the upstream client, from `config`.
    pub fn new(config: ProxyConfig) -> MedestudiaResult<Self> {
        let upstream = UpstreamClient::new(config.upstream_settings()?)?;
        if !upstream.has_api_key() {
            warn!("No upstream API key configured; completions will fail with 500 until one is set");
        }
        Ok(Self {
            upstream: Arc::new(upstream),
            config: Arc::new(config),
            metrics: Arc::new(ProxyMetrics::new()),
        })
    }
}

/// Creates the proxy router.
///
/// `/health` and `/metrics` are mounted only when `ops_routes` is enabled.
pub fn create_router(state: ApiState) -> Router {
    let cors = *state.config.cors();
    let mut router = Router::new().route(
        COMPLETION_PATH,
        post(handle_completion).fallback(method_not_allowed),
    );
    if *state.config.ops_routes() {
        router = router
            .route("/health", get(health_check))
            .route("/metrics", get(get_metrics));
    }
    let router = router.layer(TraceLayer::new_for_http()).with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Whether the `noStream` query flag opts out of streaming.
///
/// Any non-empty value counts, `0` and `false` included; an empty value does not.
pub fn no_stream_requested(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Completion endpoint.
#[instrument(skip_all, fields(tool, mode, language, stream))]
async fn handle_completion(
    State(state): State<ApiState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let request = match parse_request(&body, *state.config.max_input_chars()) {
        Ok(request) => request,
        Err(e) => {
            state.metrics.record_request(None);
            return error_response(&state, e.into());
        }
    };
    state.metrics.record_request(Some(*request.tool()));

    let no_stream = no_stream_requested(query.get("noStream").map(String::as_str));
    let params = GenerationParams::resolve(&request, no_stream);
    let span = Span::current();
    span.record("tool", request.tool().as_ref());
    span.record("mode", request.mode().as_ref());
    span.record("language", request.language().as_ref());
    span.record("stream", *params.stream());
    info!(input_chars = request.input().chars().count(), "Completion request accepted");

    let prompts = build_prompts(&request);

    if *params.stream() {
        return match state.upstream.stream(&prompts, &params).await {
            Ok(deltas) => {
                state.metrics.record_outcome(Outcome::Success);
                sse_response(deltas, state.metrics.clone())
            }
            Err(e) => error_response(&state, e.into()),
        };
    }

    match state.upstream.complete(&prompts, &params).await {
        Ok(text) => {
            let result = if request.is_conversational() {
                chat_result(&text, &request)
            } else {
                normalize_structured(&text, &request)
            };
            result_response(&state, StatusCode::OK, result)
        }
        Err(e) => error_response(&state, e.into()),
    }
}

fn parse_request(body: &[u8], max_input_chars: usize) -> Result<CompletionRequest, RequestError> {
    let raw: RawCompletionRequest = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected unparsable request body");
        RequestError::new(RequestErrorKind::InvalidBody(e.to_string()))
    })?;
    raw.validate(max_input_chars)
}

/// Any method other than POST on the completion path.
#[instrument(skip_all)]
async fn method_not_allowed(State(state): State<ApiState>) -> Response {
    state.metrics.record_request(None);
    error_response(
        &state,
        RequestError::new(RequestErrorKind::MethodNotAllowed).into(),
    )
}

/// Health check endpoint.
#[instrument(skip_all)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Counter snapshot in JSON format.
#[instrument(skip(state))]
async fn get_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}

fn error_response(state: &ApiState, err: MedestudiaError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, status = status.as_u16(), "Completion failed");
    } else {
        warn!(error = %err, status = status.as_u16(), "Completion rejected");
    }
    let result = CompletionResult::error(err.public_message(), err.raw());
    result_response(state, status, result)
}

fn result_response(state: &ApiState, status: StatusCode, result: CompletionResult) -> Response {
    state
        .metrics
        .record_outcome(Outcome::classify(status.as_u16(), result.is_error()));
    (status, Json(result)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_stream_flag() {
        assert!(!no_stream_requested(None));
        assert!(!no_stream_requested(Some("")));
        assert!(no_stream_requested(Some("1")));
        assert!(no_stream_requested(Some("true")));
        assert!(no_stream_requested(Some("0")));
        assert!(no_stream_requested(Some("false")));
    }

    #[test]
    fn test_body_errors_classified() {
        let err = parse_request(b"{not json", 2000).unwrap_err();
        assert!(matches!(err.kind, RequestErrorKind::InvalidBody(_)));

        let err = parse_request(br#"{"tool":"chat","mode":"preclinico","language":"es"}"#, 2000)
            .unwrap_err();
        assert_eq!(err.kind, RequestErrorKind::MissingFields);

        let err = parse_request(
            br#"{"tool":"essay","mode":"preclinico","language":"es","input":"x"}"#,
            2000,
        )
        .unwrap_err();
        assert_eq!(
            err.kind,
            RequestErrorKind::UnknownValue {
                field: "tool",
                value: "essay".into()
            }
        );
    }
}
