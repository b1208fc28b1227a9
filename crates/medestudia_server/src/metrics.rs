//! In-process request counters for the completion proxy.
//!
//! Counters are lock-free and shared through an `Arc`; they never carry
//! request data. With the `metrics` feature every update is mirrored to an
//! OpenTelemetry counter on the global meter.

use derive_getters::Getters;
use medestudia_core::Tool;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use strum::IntoEnumIterator;

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter},
};

/// How a request ended, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// 200 with a typed result or a finished stream
    Success,
    /// 200 with an error-typed body
    SoftError,
    /// 4xx rejection
    ClientError,
    /// 5xx failure
    ServerError,
}

impl Outcome {
    /// Classifies a buffered response.
    pub fn classify(status: u16, is_error_body: bool) -> Self {
        match status {
            400..=499 => Outcome::ClientError,
            500..=599 => Outcome::ServerError,
            _ if is_error_body => Outcome::SoftError,
            _ => Outcome::Success,
        }
    }
}

/// How a relayed stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StreamEnd {
    /// Terminal sentinel delivered
    Completed,
    /// Upstream failed and an error event was delivered
    Failed,
    /// Downstream client went away first
    Aborted,
}

#[derive(Debug, Default)]
struct ToolCounters {
    chat: AtomicU64,
    mcq: AtomicU64,
    quiz: AtomicU64,
    explain: AtomicU64,
    guides: AtomicU64,
}

impl ToolCounters {
    fn get(&self, tool: Tool) -> &AtomicU64 {
        match tool {
            Tool::Chat => &self.chat,
            Tool::Mcq => &self.mcq,
            Tool::Quiz => &self.quiz,
            Tool::Explain => &self.explain,
            Tool::Guides => &self.guides,
        }
    }
}

#[cfg(feature = "metrics")]
#[derive(Clone)]
struct OtelCounters {
    _meter: Meter,
    requests: Counter<u64>,
    outcomes: Counter<u64>,
    streams: Counter<u64>,
}

#[cfg(feature = "metrics")]
impl OtelCounters {
    fn new() -> Self {
        tracing::debug!("Getting global meter for medestudia_proxy");
        let meter = global::meter("medestudia_proxy");
        let requests = meter
            .u64_counter("proxy.requests")
            .with_description("Completion requests received")
            .build();
        let outcomes = meter
            .u64_counter("proxy.outcomes")
            .with_description("Completion requests by outcome")
            .build();
        let streams = meter
            .u64_counter("proxy.streams")
            .with_description("Relayed streams by how they ended")
            .build();
        Self {
            _meter: meter,
            requests,
            outcomes,
            streams,
        }
    }

    fn add(counter: &Counter<u64>, key: &'static str, value: &str) {
        counter.add(1, &[KeyValue::new(key, value.to_string())]);
    }
}

#[cfg(feature = "metrics")]
impl std::fmt::Debug for OtelCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelCounters").finish_non_exhaustive()
    }
}

/// Proxy-wide counters.
#[derive(Debug, Default)]
pub struct ProxyMetrics {
    requests: AtomicU64,
    by_tool: ToolCounters,
    success: AtomicU64,
    soft_errors: AtomicU64,
    client_errors: AtomicU64,
    server_errors: AtomicU64,
    streams_completed: AtomicU64,
    streams_failed: AtomicU64,
    streams_aborted: AtomicU64,
    #[cfg(feature = "metrics")]
    otel: Option<OtelCounters>,
}

impl ProxyMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "metrics")]
            otel: Some(OtelCounters::new()),
            ..Self::default()
        }
    }

    /// Counts an incoming request; `tool` is `None` when validation failed first.
    pub fn record_request(&self, tool: Option<Tool>) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(tool) = tool {
            self.by_tool.get(tool).fetch_add(1, Ordering::Relaxed);
        }
        #[cfg(feature = "metrics")]
        self.otel.iter().for_each(|otel| {
            let tool = tool.map(|t| t.as_ref().to_string());
            OtelCounters::add(&otel.requests, "tool", tool.as_deref().unwrap_or("unknown"));
        });
    }

    /// Counts how a request ended.
    pub fn record_outcome(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Success => &self.success,
            Outcome::SoftError => &self.soft_errors,
            Outcome::ClientError => &self.client_errors,
            Outcome::ServerError => &self.server_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        self.otel
            .iter()
            .for_each(|otel| OtelCounters::add(&otel.outcomes, "outcome", outcome.as_ref()));
    }

    /// Counts how a relayed stream ended.
    pub fn record_stream_end(&self, end: StreamEnd) {
        let counter = match end {
            StreamEnd::Completed => &self.streams_completed,
            StreamEnd::Failed => &self.streams_failed,
            StreamEnd::Aborted => &self.streams_aborted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        self.otel
            .iter()
            .for_each(|otel| OtelCounters::add(&otel.streams, "end", end.as_ref()));
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            requests: load(&self.requests),
            by_tool: Tool::iter()
                .map(|tool| ToolCount {
                    tool,
                    requests: load(self.by_tool.get(tool)),
                })
                .collect(),
            outcomes: OutcomeSnapshot {
                success: load(&self.success),
                soft_errors: load(&self.soft_errors),
                client_errors: load(&self.client_errors),
                server_errors: load(&self.server_errors),
            },
            streams: StreamSnapshot {
                completed: load(&self.streams_completed),
                failed: load(&self.streams_failed),
                aborted: load(&self.streams_aborted),
            },
        }
    }
}

/// Serialized form of [`ProxyMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct MetricsSnapshot {
    /// Requests received
    requests: u64,
    /// Requests per validated tool
    by_tool: Vec<ToolCount>,
    /// Outcome classes
    outcomes: OutcomeSnapshot,
    /// Stream endings
    streams: StreamSnapshot,
}

/// Request count for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct ToolCount {
    /// Tool
    tool: Tool,
    /// Requests
    requests: u64,
}

/// Outcome counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct OutcomeSnapshot {
    /// Typed results
    success: u64,
    /// Error-typed 200 bodies
    soft_errors: u64,
    /// 4xx rejections
    client_errors: u64,
    /// 5xx failures
    server_errors: u64,
}

/// Stream counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct StreamSnapshot {
    /// Sentinel delivered
    completed: u64,
    /// Error event delivered
    failed: u64,
    /// Client disconnected first
    aborted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        assert_eq!(Outcome::classify(200, false), Outcome::Success);
        assert_eq!(Outcome::classify(200, true), Outcome::SoftError);
        assert_eq!(Outcome::classify(405, true), Outcome::ClientError);
        assert_eq!(Outcome::classify(500, true), Outcome::ServerError);
    }

    #[test]
    fn test_snapshot_counts() {
        let metrics = ProxyMetrics::new();
        metrics.record_request(Some(Tool::Mcq));
        metrics.record_request(Some(Tool::Mcq));
        metrics.record_request(None);
        metrics.record_outcome(Outcome::SoftError);
        metrics.record_stream_end(StreamEnd::Aborted);

        let snapshot = metrics.snapshot();
        assert_eq!(*snapshot.requests(), 3);
        let mcq = snapshot
            .by_tool()
            .iter()
            .find(|c| *c.tool() == Tool::Mcq)
            .unwrap();
        assert_eq!(*mcq.requests(), 2);
        assert_eq!(*snapshot.outcomes().soft_errors(), 1);
        assert_eq!(*snapshot.streams().aborted(), 1);
        assert_eq!(*snapshot.streams().completed(), 0);
    }
}
