//! Relays an upstream chat stream to the caller as server-sent events.
//!
//! The relay runs in its own task and hands frames to the response body
//! through a bounded channel. When the caller disconnects the body, and
//! with it the receiver, is dropped; the task sees the closed channel,
//! stops, and drops the upstream stream, which aborts the upstream read.

use crate::metrics::{ProxyMetrics, StreamEnd};
use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use medestudia_core::StreamEvent;
use medestudia_models::{DeltaStream, UpstreamDelta};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, debug, info, warn};

/// Frames buffered between the relay task and the response body.
pub const RELAY_BUFFER: usize = 32;

/// Starts relaying `upstream` and returns the SSE response.
pub fn sse_response(upstream: DeltaStream, metrics: Arc<ProxyMetrics>) -> Response {
    let (tx, rx) = mpsc::channel::<StreamEvent>(RELAY_BUFFER);

    tokio::spawn(
        async move {
            let end = relay(upstream, tx).await;
            info!(end = %end, "Stream relay finished");
            metrics.record_stream_end(end);
        }
        .in_current_span(),
    );

    let frames = ReceiverStream::new(rx)
        .map(|event| Ok::<_, Infallible>(Bytes::from(event.to_sse_frame())));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

/// Forwards events until a terminal one has been delivered or the caller is gone.
async fn relay(mut upstream: DeltaStream, tx: mpsc::Sender<StreamEvent>) -> StreamEnd {
    let mut fragments = 0usize;
    loop {
        let item = tokio::select! {
            _ = tx.closed() => {
                debug!(fragments, "Client disconnected; dropping upstream stream");
                return StreamEnd::Aborted;
            }
            item = upstream.next() => item,
        };

        let (event, end) = match item {
            Some(Ok(UpstreamDelta::Text(text))) => (StreamEvent::content(text), None),
            Some(Ok(UpstreamDelta::Done)) | None => (StreamEvent::Done, Some(StreamEnd::Completed)),
            Some(Err(e)) => {
                warn!(error = %e, fragments, "Upstream stream failed");
                (StreamEvent::Error(e.kind.to_string()), Some(StreamEnd::Failed))
            }
        };

        if tx.send(event).await.is_err() {
            debug!(fragments, "Client disconnected; dropping upstream stream");
            return StreamEnd::Aborted;
        }
        match end {
            Some(end) => return end,
            None => fragments += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medestudia_error::{UpstreamError, UpstreamErrorKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn upstream(items: Vec<Result<UpstreamDelta, UpstreamError>>) -> DeltaStream {
        Box::pin(futures_util::stream::iter(items))
    }

    async fn drain(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_nothing_follows_done() {
        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        let end = relay(
            upstream(vec![
                Ok(UpstreamDelta::Text("a".into())),
                Ok(UpstreamDelta::Done),
                Ok(UpstreamDelta::Text("late".into())),
            ]),
            tx,
        )
        .await;
        assert_eq!(end, StreamEnd::Completed);
        assert_eq!(
            drain(rx).await,
            vec![StreamEvent::content("a"), StreamEvent::Done]
        );
    }

    #[tokio::test]
    async fn test_exhausted_upstream_still_finishes() {
        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        let end = relay(upstream(vec![Ok(UpstreamDelta::Text("a".into()))]), tx).await;
        assert_eq!(end, StreamEnd::Completed);
        assert_eq!(drain(rx).await.last(), Some(&StreamEvent::Done));
    }

    #[tokio::test]
    async fn test_single_error_event_ends_stream() {
        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        let end = relay(
            upstream(vec![
                Ok(UpstreamDelta::Text("a".into())),
                Err(UpstreamError::new(UpstreamErrorKind::StreamInterrupted(
                    "connection reset".into(),
                ))),
                Ok(UpstreamDelta::Done),
            ]),
            tx,
        )
        .await;
        assert_eq!(end, StreamEnd::Failed);
        assert_eq!(
            drain(rx).await,
            vec![
                StreamEvent::content("a"),
                StreamEvent::Error("Streaming error: connection reset".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_disconnect_drops_pending_upstream() {
        struct DropFlag(Arc<AtomicBool>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(dropped.clone());
        // Upstream that never produces anything, holding the flag until dropped.
        let pending: DeltaStream = Box::pin(async_stream::stream! {
            let _flag = flag;
            futures_util::future::pending::<()>().await;
            yield Ok::<_, UpstreamError>(UpstreamDelta::Done);
        });

        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        let task = tokio::spawn(relay(pending, tx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(rx);

        let end = tokio::time::timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
        assert_eq!(end, StreamEnd::Aborted);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
